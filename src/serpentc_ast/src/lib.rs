//! Typed AST model (spec.md §3) for the source language. The external
//! parser (out of scope, spec.md §1) emits a JSON document tagged by a
//! `type`/`kind` discriminant per node; these types derive `Deserialize`
//! so that document can be read directly with `serde_json`, the way
//! `bsharp_syntax`'s node types round-trip through JSON via `serde`.

pub mod class;
pub mod expr;
pub mod feature;
pub mod identifier;
pub mod stmt;
pub mod types;

pub use class::{ClientSpec, ExportClause, FeatureClause, InheritanceClause, Program, RenameClause, SourceClass};
pub use expr::{BinaryOperator, Expr};
pub use feature::{Feature, LiteralValue, LocalDecl, Parameter};
pub use identifier::Identifier;
pub use stmt::Stmt;
pub use types::{ResolvedType, TypeDecl};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AstError {
    #[error("malformed AST JSON: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Parse the external parser's JSON AST into a [`Program`]. Corresponds to
/// spec.md §6 "Input AST (JSON)": a tree of nodes tagged by a `type`
/// string, read from the parser subprocess's standard output.
pub fn program_from_json(json: &str) -> Result<Program, AstError> {
    Ok(serde_json::from_str(json)?)
}

pub fn program_to_json(program: &Program) -> Result<String, AstError> {
    Ok(serde_json::to_string_pretty(program)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_minimal_program_through_json() {
        let program = Program {
            classes: vec![SourceClass {
                name: Identifier::new("APPLICATION"),
                generic_formals: vec![],
                inherits: vec![],
                creation: vec![Identifier::new("make")],
                feature_clauses: vec![FeatureClause {
                    clients: ClientSpec::All,
                    features: vec![Feature::Method {
                        name: Identifier::new("make"),
                        parameters: vec![],
                        return_type: None,
                        locals: vec![],
                        body: vec![],
                        location: None,
                    }],
                }],
                is_general: false,
                location: None,
            }],
            main_class: Some(Identifier::new("APPLICATION")),
            main_routine: Some(Identifier::new("make")),
        };

        let json = program_to_json(&program).unwrap();
        let parsed = program_from_json(&json).unwrap();
        assert_eq!(parsed.classes.len(), 1);
        assert_eq!(parsed.classes[0].name.as_str(), "APPLICATION");
        assert_eq!(parsed.main_routine.unwrap().as_str(), "make");
    }

    #[test]
    fn rejects_malformed_json() {
        let err = program_from_json("not json").unwrap_err();
        assert!(matches!(err, AstError::Malformed(_)));
    }
}
