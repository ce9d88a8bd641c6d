//! Typed, tree-shaped IR (spec.md §3 "Typed IR"): the output of type
//! checking (component #5) and the input to bytecode emission
//! (component #8). Purely data — no phase here mutates or validates
//! anything; that happens in `serpentc_check` and `serpentc_codegen`.

pub mod class;
pub mod expr;
pub mod stmt;

pub use class::{TClass, TField, TMethod, TProgram};
pub use expr::TExpr;
pub use stmt::{TAssignTarget, TStmt};

#[cfg(test)]
mod tests {
    use super::*;
    use serpentc_ast::ResolvedType;

    #[test]
    fn literal_types_match_their_canonical_primitive() {
        assert_eq!(TExpr::IntegerLiteral { value: 1 }.ty(), ResolvedType::integer());
        assert_eq!(TExpr::BoolLiteral { value: true }.ty(), ResolvedType::boolean());
    }

    #[test]
    fn a_method_reports_its_own_mangled_name() {
        let method = TMethod::UserDefined {
            mangled_name: "POINT_x".to_string(),
            parameters: vec![],
            return_type: Some(ResolvedType::integer()),
            locals: vec![],
            body: vec![],
            is_constructor: false,
        };
        assert_eq!(method.mangled_name(), "POINT_x");
        assert_eq!(method.return_type(), Some(&ResolvedType::integer()));
    }
}
