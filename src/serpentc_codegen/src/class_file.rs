//! Binary class-file serialization (spec.md §4.9): magic, version, the
//! constant pool, access flags, this/super indices, the fields table, the
//! methods table (each method carrying a Code attribute). All multi-byte
//! fields are big-endian.

use crate::errors::CodegenResult;
use crate::pool::ConstantPool;

const MAGIC: u32 = 0xCAFEBABE;

/// `major = release + 44` (spec.md §4.9), the published mapping from a
/// requested release number (`5..16`) to the target VM's major version.
pub fn major_version_for_release(release: u16) -> u16 {
    release + 44
}

const ACC_PUBLIC: u16 = 0x0001;
const ACC_SUPER: u16 = 0x0020;
const ACC_STATIC: u16 = 0x0008;
const ACC_VARARGS: u16 = 0x0080;

/// One field entry ready for serialization (spec.md §4.9 "Each field
/// entry"): public, no attributes.
pub struct FieldEntry {
    pub name_index: u16,
    pub descriptor_index: u16,
}

/// One method entry (spec.md §4.9 "Each method entry"): exactly one
/// attribute, the Code attribute.
pub struct MethodEntry {
    pub name_index: u16,
    pub descriptor_index: u16,
    pub is_static: bool,
    pub is_varargs: bool,
    pub max_locals: u16,
    pub code: Vec<u8>,
}

/// A complete class file ready to serialize, already carrying its own
/// constant pool (spec.md §3 "Lifecycles": "Constant pools are built per
/// emitted class ... once a class file is serialized, its pool is
/// discarded").
pub struct ClassFile {
    pub pool: ConstantPool,
    pub this_class_index: u16,
    pub super_class_index: u16,
    pub major_version: u16,
    pub fields: Vec<FieldEntry>,
    pub methods: Vec<MethodEntry>,
}

/// `max_stack` is a fixed generous constant (spec.md §9 Open Question (a),
/// resolved in SPEC_FULL.md §D): verification is disabled at load time, so
/// no dataflow analysis is performed to find a tighter bound.
pub const MAX_STACK: u16 = 1024;

impl ClassFile {
    pub fn serialize(&self) -> CodegenResult<Vec<u8>> {
        let mut out = Vec::new();
        out.extend_from_slice(&MAGIC.to_be_bytes());
        out.extend_from_slice(&0u16.to_be_bytes()); // minor
        out.extend_from_slice(&self.major_version.to_be_bytes());

        let pool_count = (self.pool.len() + 1) as u16;
        out.extend_from_slice(&pool_count.to_be_bytes());
        out.extend_from_slice(&self.pool.serialize());

        out.extend_from_slice(&(ACC_PUBLIC | ACC_SUPER).to_be_bytes());
        out.extend_from_slice(&self.this_class_index.to_be_bytes());
        out.extend_from_slice(&self.super_class_index.to_be_bytes());
        out.extend_from_slice(&0u16.to_be_bytes()); // interfaces count

        out.extend_from_slice(&(self.fields.len() as u16).to_be_bytes());
        for field in &self.fields {
            out.extend_from_slice(&ACC_PUBLIC.to_be_bytes());
            out.extend_from_slice(&field.name_index.to_be_bytes());
            out.extend_from_slice(&field.descriptor_index.to_be_bytes());
            out.extend_from_slice(&0u16.to_be_bytes()); // attribute count
        }

        out.extend_from_slice(&(self.methods.len() as u16).to_be_bytes());
        let code_name_index = self.pool.find_utf8("Code")?;
        for method in &self.methods {
            let mut flags = ACC_PUBLIC;
            if method.is_static {
                flags |= ACC_STATIC;
            }
            if method.is_varargs {
                flags |= ACC_VARARGS;
            }
            out.extend_from_slice(&flags.to_be_bytes());
            out.extend_from_slice(&method.name_index.to_be_bytes());
            out.extend_from_slice(&method.descriptor_index.to_be_bytes());
            out.extend_from_slice(&1u16.to_be_bytes()); // attribute count

            out.extend_from_slice(&code_name_index.to_be_bytes());
            let code_len = method.code.len() as u32;
            let attr_len = 12 + code_len;
            out.extend_from_slice(&attr_len.to_be_bytes());
            out.extend_from_slice(&MAX_STACK.to_be_bytes());
            out.extend_from_slice(&method.max_locals.to_be_bytes());
            out.extend_from_slice(&code_len.to_be_bytes());
            out.extend_from_slice(&method.code);
            out.extend_from_slice(&0u16.to_be_bytes()); // exception table length
            out.extend_from_slice(&0u16.to_be_bytes()); // code attributes count
        }

        out.extend_from_slice(&0u16.to_be_bytes()); // class attributes count
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn major_version_follows_the_release_plus_44_mapping() {
        assert_eq!(major_version_for_release(8), 52);
        assert_eq!(major_version_for_release(17), 61);
    }

    #[test]
    fn a_minimal_class_file_starts_with_the_magic_number() {
        let mut pool = ConstantPool::new();
        pool.add_utf8("Code").unwrap();
        let this_index = pool.add_class("APPLICATION").unwrap();
        let super_index = pool.add_class("GENERAL").unwrap();
        let class = ClassFile {
            pool,
            this_class_index: this_index,
            super_class_index: super_index,
            major_version: 52,
            fields: vec![],
            methods: vec![],
        };
        let bytes = class.serialize().unwrap();
        assert_eq!(&bytes[0..4], &MAGIC.to_be_bytes());
    }

    #[test]
    fn pool_count_header_is_entry_count_plus_one() {
        let mut pool = ConstantPool::new();
        pool.add_utf8("Code").unwrap();
        let this_index = pool.add_class("APPLICATION").unwrap();
        let super_index = pool.add_class("GENERAL").unwrap();
        let entry_count = pool.len();
        let class = ClassFile {
            pool,
            this_class_index: this_index,
            super_class_index: super_index,
            major_version: 52,
            fields: vec![],
            methods: vec![],
        };
        let bytes = class.serialize().unwrap();
        let header_count = u16::from_be_bytes([bytes[8], bytes[9]]);
        assert_eq!(header_count as usize, entry_count + 1);
    }
}
