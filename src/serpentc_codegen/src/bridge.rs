//! The host-runtime bridge (spec.md §4.8): the small set of classes and
//! fields the core only *names*, never defines. Compiled separately by the
//! host toolchain and copied alongside the emitted class files (spec.md §6
//! "Output layout").
//!
//! `RUNTIME_PACKAGE` qualifies every bridge class's internal (slash-
//! separated) name; source-level classes stay unqualified at the root
//! package (SPEC_FULL.md §C.1 "Package-qualified class names" — the detail
//! `original_source` fixes that spec.md §4.6 leaves to the implementation).
pub const RUNTIME_PACKAGE: &str = "org/eiffel/base";

pub const INTEGER_WRAPPER: &str = "INTEGER";
pub const REAL_WRAPPER: &str = "REAL";
pub const BOOLEAN_WRAPPER: &str = "BOOLEAN";
pub const CHARACTER_WRAPPER: &str = "CHARACTER";
pub const STRING_WRAPPER: &str = "STRING";
pub const ARRAY_WRAPPER: &str = "ARRAY";
/// The synthesized root class's own supertype (spec.md §4.5 "the root
/// itself declares a small set of constructors bridging to the host
/// runtime's primitive-wrapper class").
pub const ANY_BRIDGE_CLASS: &str = "ANY";

const BRIDGE_CLASSES: &[&str] = &[
    INTEGER_WRAPPER,
    REAL_WRAPPER,
    BOOLEAN_WRAPPER,
    CHARACTER_WRAPPER,
    STRING_WRAPPER,
    ARRAY_WRAPPER,
    ANY_BRIDGE_CLASS,
];

/// The raw fields every wrapper class carries (spec.md §4.8: "public raw
/// fields `raw_int:int`, `raw_float:float`, `raw_string:string`"). Boolean
/// values are packed/unpacked through `raw_int` (spec.md §4.7 represents a
/// boolean as "the wrapper object around a raw int"); `CHARACTER` is backed
/// by `raw_string`, a single-character host string, not `raw_int` —
/// `original_source` never gives `CHARACTER` its own raw representation.
pub const RAW_INT_FIELD: &str = "raw_int";
pub const RAW_FLOAT_FIELD: &str = "raw_float";
pub const RAW_STRING_FIELD: &str = "raw_string";

/// Whether `class_name` is one the host bridge supplies rather than one
/// this compiler emits itself.
pub fn is_bridge_class(class_name: &str) -> bool {
    BRIDGE_CLASSES.contains(&class_name)
}

/// The internal (slash-separated, JVM-style) name for a source-level class
/// name: bridge classes are package-qualified, everything this compiler
/// itself emits lives at the root package.
pub fn internal_class_name(class_name: &str) -> String {
    if is_bridge_class(class_name) {
        format!("{RUNTIME_PACKAGE}/{class_name}")
    } else {
        class_name.to_string()
    }
}

/// The raw field backing a wrapper type's packed value, used when
/// unpacking a wrapper before an external call and repacking its result
/// (spec.md §4.7 "External call").
pub fn raw_field_for(wrapper_class: &str) -> Option<&'static str> {
    match wrapper_class {
        INTEGER_WRAPPER | BOOLEAN_WRAPPER => Some(RAW_INT_FIELD),
        REAL_WRAPPER => Some(RAW_FLOAT_FIELD),
        STRING_WRAPPER | CHARACTER_WRAPPER => Some(RAW_STRING_FIELD),
        _ => None,
    }
}

/// Maps a resolved source type's class name to the wrapper that holds it,
/// for classes that *are* primitives in the source language.
pub fn wrapper_for_primitive(class_name: &str) -> Option<&'static str> {
    match class_name {
        serpentc_ast::types::INTEGER_CLASS => Some(INTEGER_WRAPPER),
        serpentc_ast::types::REAL_CLASS => Some(REAL_WRAPPER),
        serpentc_ast::types::BOOLEAN_CLASS => Some(BOOLEAN_WRAPPER),
        serpentc_ast::types::CHARACTER_CLASS => Some(CHARACTER_WRAPPER),
        serpentc_ast::types::STRING_CLASS => Some(STRING_WRAPPER),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bridge_classes_are_package_qualified() {
        assert_eq!(internal_class_name("INTEGER"), "org/eiffel/base/INTEGER");
    }

    #[test]
    fn source_classes_stay_at_the_root_package() {
        assert_eq!(internal_class_name("APPLICATION"), "APPLICATION");
    }

    #[test]
    fn every_primitive_wrapper_has_a_raw_field() {
        for wrapper in [INTEGER_WRAPPER, REAL_WRAPPER, BOOLEAN_WRAPPER, CHARACTER_WRAPPER, STRING_WRAPPER] {
            assert!(raw_field_for(wrapper).is_some());
        }
    }
}
