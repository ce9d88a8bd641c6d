use serpentc_ast::ResolvedType;
use serpentc_ir::TExpr;

/// Wraps an `INTEGER`-typed expression in a call to `to_real` so it can
/// stand where a `REAL` is expected (spec.md §4.3 "Implicit numeric
/// coercion"). Leaves anything else untouched.
pub fn coerce_integer_to_real(expr: TExpr) -> TExpr {
    TExpr::FeatureCall {
        receiver: Box::new(expr),
        mangled_name: "INTEGER_to_real".to_string(),
        arguments: Vec::new(),
        ty: ResolvedType::real(),
    }
}

/// The type-appropriate zero a function's `local_Result` is initialized to
/// before its body runs (spec.md §4.3 "Function prologue").
pub fn zero_value_for(ty: &ResolvedType) -> TExpr {
    match ty.name() {
        serpentc_ast::types::INTEGER_CLASS => TExpr::IntegerLiteral { value: 0 },
        serpentc_ast::types::REAL_CLASS => TExpr::RealLiteral { value: 0.0 },
        serpentc_ast::types::BOOLEAN_CLASS => TExpr::BoolLiteral { value: false },
        serpentc_ast::types::CHARACTER_CLASS => TExpr::CharacterLiteral { value: '\0' },
        serpentc_ast::types::STRING_CLASS => TExpr::StringLiteral { value: String::new() },
        _ => TExpr::VoidLiteral { ty: ty.clone() },
    }
}
