use serpentc_ast::{BinaryOperator, ResolvedType};

/// A fully type-checked expression (spec.md §3 "Typed IR"). Every variant
/// carries its own resolved type so the bytecode emitter never has to
/// re-derive it.
#[derive(Debug, Clone)]
pub enum TExpr {
    IntegerLiteral {
        value: i64,
    },
    RealLiteral {
        value: f64,
    },
    CharacterLiteral {
        value: char,
    },
    StringLiteral {
        value: String,
    },
    BoolLiteral {
        value: bool,
    },
    VoidLiteral {
        ty: ResolvedType,
    },
    /// `Current`, typed as the enclosing class's own resolved type.
    Current {
        ty: ResolvedType,
    },
    /// A local or parameter read; the name is already mangled
    /// (`local_<name>`, spec.md §4.4).
    Variable {
        mangled_name: String,
        ty: ResolvedType,
    },
    /// A field read, always through the receiver (`Current` for an
    /// unqualified reference).
    FieldAccess {
        receiver: Box<TExpr>,
        mangled_name: String,
        ty: ResolvedType,
    },
    /// A call to a routine or constant; constants are inlined away by the
    /// type checker before reaching this representation (spec.md §4.3
    /// "constants inline to their literal value at the call site"), so
    /// every `FeatureCall` left here names an actual routine.
    FeatureCall {
        receiver: Box<TExpr>,
        mangled_name: String,
        arguments: Vec<TExpr>,
        ty: ResolvedType,
    },
    /// A call to a specific ancestor's original body, already
    /// disambiguated to one `Precursor_<Parent>_<This>_<name>` handle.
    /// `target_mangled_name` is the ancestor's own `<Class>_<feature>`
    /// handle (spec.md §4.4) the emitter actually dispatches to; the
    /// descriptive `precursor_name` is kept for diagnostics.
    PrecursorCall {
        precursor_name: String,
        target_mangled_name: String,
        arguments: Vec<TExpr>,
        ty: ResolvedType,
    },
    CreateExpr {
        type_decl: ResolvedType,
        constructor: String,
        arguments: Vec<TExpr>,
    },
    BinaryOp {
        operator: BinaryOperator,
        left: Box<TExpr>,
        right: Box<TExpr>,
        ty: ResolvedType,
    },
    UnaryNot {
        operand: Box<TExpr>,
    },
}

impl TExpr {
    pub fn ty(&self) -> ResolvedType {
        match self {
            TExpr::IntegerLiteral { .. } => ResolvedType::integer(),
            TExpr::RealLiteral { .. } => ResolvedType::real(),
            TExpr::CharacterLiteral { .. } => ResolvedType::character(),
            TExpr::StringLiteral { .. } => ResolvedType::string(),
            TExpr::BoolLiteral { .. } => ResolvedType::boolean(),
            TExpr::VoidLiteral { ty }
            | TExpr::Current { ty }
            | TExpr::Variable { ty, .. }
            | TExpr::FieldAccess { ty, .. }
            | TExpr::FeatureCall { ty, .. }
            | TExpr::PrecursorCall { ty, .. }
            | TExpr::BinaryOp { ty, .. } => ty.clone(),
            TExpr::CreateExpr { type_decl, .. } => type_decl.clone(),
            TExpr::UnaryNot { .. } => ResolvedType::boolean(),
        }
    }
}
