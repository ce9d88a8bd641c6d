//! Bytecode emission (spec.md §4.7-§4.9): turns a fully type-checked
//! `TProgram` into one class file per `TClass`. Dispatch choice (spec.md
//! §4.5): every ordinary routine call is emitted as `invokevirtual` against
//! the synthesized root class rather than the callee's own declaring
//! class. `serpentc_check` mangles a feature's call-site name from the
//! *receiver's static type*, not its declaring origin, so two classes that
//! merely inherit a feature unchanged end up with two independently
//! class-prefixed mangled names for what is semantically one shared body —
//! genuine JVM vtable dispatch on the declaring class would require a
//! single shared short name and descriptor across the hierarchy instead.
//! Routing every call through the root's own flattened, de-duplicated
//! feature set sidesteps that without touching `serpentc_check` (see
//! DESIGN.md for the full tradeoff).

pub mod bridge;
pub mod class_file;
pub mod descriptor;
pub mod emit;
pub mod errors;
pub mod instr;
pub mod lower;
pub mod pool;
pub mod signature;

use std::collections::HashMap;

use serpentc_diagnostics::{DiagnosticCode, DiagnosticCollection, Phase};
use serpentc_ir::TProgram;

use crate::errors::CodegenError;
use crate::signature::SignatureTable;

/// Emits every class in `program`, keyed by its unqualified class name
/// (the CLI's `build` command then writes each to `<name>.class`, spec.md
/// §6 "Output layout"). A per-class recoverable emission problem
/// (malformed external alias, a primitive the bridge doesn't know how to
/// unwrap, or a pool/branch limit overrun) is recorded as a
/// `Phase::Emission` diagnostic and that one class is skipped; every other
/// class still emits. An internal-invariant violation (an unresolved
/// branch label, a descriptor the program-wide signature table somehow
/// lacks) aborts the whole emission immediately — these indicate a bug
/// upstream of codegen, not a malformed source program.
pub fn emit_program(program: &TProgram, release: u16) -> Result<(HashMap<String, Vec<u8>>, DiagnosticCollection), CodegenError> {
    let signatures = SignatureTable::build(program);
    let mut outputs = HashMap::new();
    let mut diagnostics = DiagnosticCollection::new();

    for class in &program.classes {
        match emit::emit_class(class, program, release, &signatures) {
            Ok((name, bytes)) => {
                outputs.insert(name, bytes);
            }
            Err(err) => match emission_code(&err) {
                Some(code) => diagnostics.add_error(Phase::Emission, code, None, format!("class `{}`: {err}", class.name)),
                None => return Err(err),
            },
        }
    }

    Ok((outputs, diagnostics))
}

/// Maps the `CodegenError` variants spec.md §7's EE5xxx band covers onto
/// their diagnostic code; the remaining variants (`UnresolvedLabel`,
/// `MissingDescriptor`) are internal invariants with no source-level cause
/// to report, so they have no code here and abort emission instead.
fn emission_code(err: &CodegenError) -> Option<DiagnosticCode> {
    match err {
        CodegenError::MalformedExternalAlias(_) => Some(DiagnosticCode::EE5001MalformedExternalAlias),
        CodegenError::UnsupportedBridgePrimitive(_) => Some(DiagnosticCode::EE5002UnsupportedBridgePrimitive),
        CodegenError::PoolIndexOverflow(_) => Some(DiagnosticCode::EE5003PoolIndexOverflow),
        CodegenError::BranchOffsetOutOfRange(_) => Some(DiagnosticCode::EE5004BranchOffsetOutOfRange),
        CodegenError::UnresolvedLabel(_) | CodegenError::MissingDescriptor(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serpentc_ast::ResolvedType;
    use serpentc_ir::{TClass, TField, TMethod};

    fn sample_program() -> TProgram {
        TProgram {
            classes: vec![
                TClass {
                    name: "GENERAL".to_string(),
                    super_class: "ANY".to_string(),
                    fields: vec![],
                    methods: vec![],
                    is_root: true,
                },
                TClass {
                    name: "APPLICATION".to_string(),
                    super_class: "GENERAL".to_string(),
                    fields: vec![TField { mangled_name: "APPLICATION_count".to_string(), ty: ResolvedType::integer() }],
                    methods: vec![TMethod::UserDefined {
                        mangled_name: "APPLICATION_make".to_string(),
                        parameters: vec![],
                        return_type: None,
                        locals: vec![],
                        body: vec![],
                        is_constructor: true,
                    }],
                    is_root: false,
                },
            ],
            main_class: Some("APPLICATION".to_string()),
            main_routine: Some("APPLICATION_make".to_string()),
        }
    }

    #[test]
    fn emits_one_class_file_per_class_and_no_diagnostics() {
        let program = sample_program();
        let (outputs, diagnostics) = emit_program(&program, 8).unwrap();
        assert!(!diagnostics.has_errors());
        assert!(outputs.contains_key("GENERAL"));
        assert!(outputs.contains_key("APPLICATION"));
        assert_eq!(&outputs["APPLICATION"][0..4], &0xCAFEBABEu32.to_be_bytes());
    }

    #[test]
    fn main_class_gets_a_main_method_stub() {
        let program = sample_program();
        let (outputs, _) = emit_program(&program, 8).unwrap();
        let general_bytes = &outputs["GENERAL"];
        let application_bytes = &outputs["APPLICATION"];
        assert!(application_bytes.len() > general_bytes.len() || application_bytes != general_bytes);
    }

    #[test]
    fn a_malformed_external_alias_is_reported_without_aborting_the_rest() {
        let mut program = sample_program();
        program.classes.push(TClass {
            name: "BROKEN".to_string(),
            super_class: "GENERAL".to_string(),
            fields: vec![],
            methods: vec![TMethod::External {
                mangled_name: "BROKEN_bad".to_string(),
                parameters: vec![],
                return_type: None,
                host_language: "java".to_string(),
                alias: "no_dot_here".to_string(),
            }],
            is_root: false,
        });
        let (outputs, diagnostics) = emit_program(&program, 8).unwrap();
        assert!(diagnostics.has_errors());
        assert!(!outputs.contains_key("BROKEN"));
        assert!(outputs.contains_key("APPLICATION"));
    }
}
