use std::collections::HashMap;

use crate::errors::{CodegenError, CodegenResult};

/// JVM constant-pool tags (spec.md §3 "Constant pool (per class)"): the
/// fixed set this compiler needs. `Long`/`Double`/`InterfaceMethodref` are
/// not part of the data model (spec.md §9's Open Question (b) resolves
/// `REAL` to the 4-byte `Float` form, never `Double`).
const TAG_UTF8: u8 = 1;
const TAG_INTEGER: u8 = 3;
const TAG_FLOAT: u8 = 4;
const TAG_CLASS: u8 = 7;
const TAG_STRING: u8 = 8;
const TAG_FIELDREF: u8 = 9;
const TAG_METHODREF: u8 = 10;
const TAG_NAME_AND_TYPE: u8 = 12;

#[derive(Debug, Clone)]
enum PoolEntry {
    Utf8(String),
    Integer(i32),
    Float(f32),
    /// `CONSTANT_String`: an indirect reference to a `Utf8` entry.
    StringRef(u16),
    /// `CONSTANT_Class`: an indirect reference to a `Utf8` entry holding
    /// the class's internal (slash-separated) name.
    Class(u16),
    NameAndType(u16, u16),
    /// `(class_index, name_and_type_index)`.
    Fieldref(u16, u16),
    Methodref(u16, u16),
}

/// Per-class constant pool (spec.md §3 "Constant pool (per class)", §4.6).
/// Every `add_*` operation is an idempotent insert keyed by semantic
/// content, never by call order: inserting an equivalent entry twice
/// returns the same 1-based index both times (spec.md §8 "Pool
/// deduplication").
#[derive(Debug, Clone, Default)]
pub struct ConstantPool {
    entries: Vec<PoolEntry>,
    utf8_by_text: HashMap<String, u16>,
    integer_by_value: HashMap<i32, u16>,
    float_by_bits: HashMap<u32, u16>,
    string_by_text: HashMap<String, u16>,
    class_by_name: HashMap<String, u16>,
    name_and_type_by_key: HashMap<(String, String), u16>,
    fieldref_by_key: HashMap<(String, String, String), u16>,
    methodref_by_key: HashMap<(String, String, String), u16>,
}

impl ConstantPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries currently in the pool. The class-file header's
    /// `constant_pool_count` is this value plus one (spec.md §4.9).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push(&mut self, entry: PoolEntry) -> CodegenResult<u16> {
        let index = self.entries.len() + 1;
        let index: u16 = index
            .try_into()
            .map_err(|_| CodegenError::PoolIndexOverflow(index))?;
        self.entries.push(entry);
        Ok(index)
    }

    pub fn add_utf8(&mut self, text: &str) -> CodegenResult<u16> {
        if let Some(&index) = self.utf8_by_text.get(text) {
            return Ok(index);
        }
        let index = self.push(PoolEntry::Utf8(text.to_string()))?;
        self.utf8_by_text.insert(text.to_string(), index);
        Ok(index)
    }

    pub fn add_integer(&mut self, value: i32) -> CodegenResult<u16> {
        if let Some(&index) = self.integer_by_value.get(&value) {
            return Ok(index);
        }
        let index = self.push(PoolEntry::Integer(value))?;
        self.integer_by_value.insert(value, index);
        Ok(index)
    }

    pub fn add_float(&mut self, value: f32) -> CodegenResult<u16> {
        let bits = value.to_bits();
        if let Some(&index) = self.float_by_bits.get(&bits) {
            return Ok(index);
        }
        let index = self.push(PoolEntry::Float(value))?;
        self.float_by_bits.insert(bits, index);
        Ok(index)
    }

    pub fn add_string(&mut self, text: &str) -> CodegenResult<u16> {
        if let Some(&index) = self.string_by_text.get(text) {
            return Ok(index);
        }
        let utf8 = self.add_utf8(text)?;
        let index = self.push(PoolEntry::StringRef(utf8))?;
        self.string_by_text.insert(text.to_string(), index);
        Ok(index)
    }

    pub fn add_class(&mut self, fq_name: &str) -> CodegenResult<u16> {
        if let Some(&index) = self.class_by_name.get(fq_name) {
            return Ok(index);
        }
        let utf8 = self.add_utf8(fq_name)?;
        let index = self.push(PoolEntry::Class(utf8))?;
        self.class_by_name.insert(fq_name.to_string(), index);
        Ok(index)
    }

    pub fn add_name_and_type(&mut self, name: &str, descriptor: &str) -> CodegenResult<u16> {
        let key = (name.to_string(), descriptor.to_string());
        if let Some(&index) = self.name_and_type_by_key.get(&key) {
            return Ok(index);
        }
        let name_idx = self.add_utf8(name)?;
        let desc_idx = self.add_utf8(descriptor)?;
        let index = self.push(PoolEntry::NameAndType(name_idx, desc_idx))?;
        self.name_and_type_by_key.insert(key, index);
        Ok(index)
    }

    pub fn add_fieldref(&mut self, class: &str, name: &str, descriptor: &str) -> CodegenResult<u16> {
        let key = (class.to_string(), name.to_string(), descriptor.to_string());
        if let Some(&index) = self.fieldref_by_key.get(&key) {
            return Ok(index);
        }
        let class_idx = self.add_class(class)?;
        let nat_idx = self.add_name_and_type(name, descriptor)?;
        let index = self.push(PoolEntry::Fieldref(class_idx, nat_idx))?;
        self.fieldref_by_key.insert(key, index);
        Ok(index)
    }

    pub fn add_methodref(&mut self, class: &str, name: &str, descriptor: &str) -> CodegenResult<u16> {
        let key = (class.to_string(), name.to_string(), descriptor.to_string());
        if let Some(&index) = self.methodref_by_key.get(&key) {
            return Ok(index);
        }
        let class_idx = self.add_class(class)?;
        let nat_idx = self.add_name_and_type(name, descriptor)?;
        let index = self.push(PoolEntry::Methodref(class_idx, nat_idx))?;
        self.methodref_by_key.insert(key, index);
        Ok(index)
    }

    pub fn find_utf8(&self, text: &str) -> CodegenResult<u16> {
        self.utf8_by_text
            .get(text)
            .copied()
            .ok_or_else(|| CodegenError::MissingDescriptor(text.to_string()))
    }

    pub fn find_class(&self, fq_name: &str) -> CodegenResult<u16> {
        self.class_by_name
            .get(fq_name)
            .copied()
            .ok_or_else(|| CodegenError::MissingDescriptor(fq_name.to_string()))
    }

    pub fn find_methodref(&self, class: &str, name: &str, descriptor: &str) -> CodegenResult<u16> {
        self.methodref_by_key
            .get(&(class.to_string(), name.to_string(), descriptor.to_string()))
            .copied()
            .ok_or_else(|| CodegenError::MissingDescriptor(format!("{class}.{name}{descriptor}")))
    }

    /// Serializes every entry in insertion order, the body of the
    /// class-file's constant pool table (spec.md §4.9).
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        for entry in &self.entries {
            match entry {
                PoolEntry::Utf8(text) => {
                    buf.push(TAG_UTF8);
                    let bytes = text.as_bytes();
                    buf.extend_from_slice(&(bytes.len() as u16).to_be_bytes());
                    buf.extend_from_slice(bytes);
                }
                PoolEntry::Integer(value) => {
                    buf.push(TAG_INTEGER);
                    buf.extend_from_slice(&value.to_be_bytes());
                }
                PoolEntry::Float(value) => {
                    buf.push(TAG_FLOAT);
                    buf.extend_from_slice(&value.to_bits().to_be_bytes());
                }
                PoolEntry::StringRef(utf8) => {
                    buf.push(TAG_STRING);
                    buf.extend_from_slice(&utf8.to_be_bytes());
                }
                PoolEntry::Class(utf8) => {
                    buf.push(TAG_CLASS);
                    buf.extend_from_slice(&utf8.to_be_bytes());
                }
                PoolEntry::NameAndType(name, desc) => {
                    buf.push(TAG_NAME_AND_TYPE);
                    buf.extend_from_slice(&name.to_be_bytes());
                    buf.extend_from_slice(&desc.to_be_bytes());
                }
                PoolEntry::Fieldref(class, nat) => {
                    buf.push(TAG_FIELDREF);
                    buf.extend_from_slice(&class.to_be_bytes());
                    buf.extend_from_slice(&nat.to_be_bytes());
                }
                PoolEntry::Methodref(class, nat) => {
                    buf.push(TAG_METHODREF);
                    buf.extend_from_slice(&class.to_be_bytes());
                    buf.extend_from_slice(&nat.to_be_bytes());
                }
            }
        }
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inserting_the_same_utf8_twice_returns_the_same_index() {
        let mut pool = ConstantPool::new();
        let a = pool.add_utf8("STRING").unwrap();
        let b = pool.add_utf8("STRING").unwrap();
        assert_eq!(a, b);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn class_entries_dedup_by_fully_qualified_name() {
        let mut pool = ConstantPool::new();
        let a = pool.add_class("APPLICATION").unwrap();
        let b = pool.add_class("APPLICATION").unwrap();
        assert_eq!(a, b);
        // one Class entry + its backing Utf8 entry
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn fieldref_entries_dedup_by_class_name_descriptor() {
        let mut pool = ConstantPool::new();
        let a = pool.add_fieldref("POINT", "POINT_x", "LINTEGER;").unwrap();
        let b = pool.add_fieldref("POINT", "POINT_x", "LINTEGER;").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn string_and_class_entries_are_distinct_pools() {
        let mut pool = ConstantPool::new();
        let string_idx = pool.add_string("APPLICATION").unwrap();
        let class_idx = pool.add_class("APPLICATION").unwrap();
        assert_ne!(string_idx, class_idx);
    }

    #[test]
    fn serialized_entry_count_matches_constant_pool_count_minus_one() {
        let mut pool = ConstantPool::new();
        pool.add_integer(42).unwrap();
        pool.add_class("GENERAL").unwrap();
        // GENERAL -> 1 Class entry + 1 Utf8 entry, plus the Integer entry
        assert_eq!(pool.len(), 3);
    }
}
