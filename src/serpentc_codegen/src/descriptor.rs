//! Descriptor grammar (spec.md §4.6): `V` (void), `L<fq-name>;`
//! (reference), `(<params>)<return>` (method). Every value in this
//! language's object model is a reference to a wrapper or user-class
//! object (spec.md §4.7 "Boolean representation" generalizes to every
//! primitive), so ordinary descriptors are always the reference form;
//! only the host-interop path (spec.md §4.6 "For host-runtime interop")
//! ever produces a primitive descriptor letter.
use serpentc_ast::ResolvedType;

use crate::bridge::internal_class_name;

pub const VOID_DESCRIPTOR: &str = "V";

pub fn reference_descriptor(internal_name: &str) -> String {
    format!("L{internal_name};")
}

/// The descriptor for a resolved source type as it appears on an ordinary
/// (non-external) field or method signature: always a reference, since
/// every source value is boxed (spec.md §3 "Resolved Type", §4.7).
pub fn type_descriptor(ty: &ResolvedType) -> String {
    reference_descriptor(&internal_class_name(ty.name()))
}

/// `(<param-descriptors>)<return-descriptor>` (spec.md §4.6). `return_ty`
/// of `None` is a procedure (`V`); `Some` is a function.
pub fn method_descriptor(param_descriptors: &[String], return_descriptor: &str) -> String {
    let mut out = String::from("(");
    for d in param_descriptors {
        out.push_str(d);
    }
    out.push(')');
    out.push_str(return_descriptor);
    out
}

/// Host-runtime primitive descriptors (spec.md §4.6: "primitive arguments
/// use the host's own primitive descriptors rather than the wrapped object
/// descriptors"). Falls back to the ordinary reference descriptor for
/// types the host bridge does not unwrap to a raw primitive (user classes,
/// `ARRAY`).
pub fn host_primitive_descriptor(ty: &ResolvedType) -> String {
    match ty.name() {
        serpentc_ast::types::INTEGER_CLASS => "I".to_string(),
        serpentc_ast::types::REAL_CLASS => "F".to_string(),
        serpentc_ast::types::BOOLEAN_CLASS => "Z".to_string(),
        // A `CHARACTER` is a single-character host string, not a JVM `char`
        // (`original_source` packs/unpacks it exactly like `STRING`).
        serpentc_ast::types::CHARACTER_CLASS => "Ljava/lang/String;".to_string(),
        serpentc_ast::types::STRING_CLASS => "Ljava/lang/String;".to_string(),
        serpentc_ast::types::VOID_TYPE_NAME => VOID_DESCRIPTOR.to_string(),
        _ => type_descriptor(ty),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_descriptor_wraps_the_internal_name() {
        assert_eq!(reference_descriptor("APPLICATION"), "LAPPLICATION;");
    }

    #[test]
    fn method_descriptor_concatenates_params_and_return() {
        let d = method_descriptor(&["LINTEGER;".to_string(), "LSTRING;".to_string()], "V");
        assert_eq!(d, "(LINTEGER;LSTRING;)V");
    }

    #[test]
    fn host_primitive_descriptor_narrows_known_wrappers() {
        assert_eq!(host_primitive_descriptor(&ResolvedType::integer()), "I");
        assert_eq!(host_primitive_descriptor(&ResolvedType::string()), "Ljava/lang/String;");
    }
}
