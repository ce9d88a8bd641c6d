use serde::{Deserialize, Serialize};

use crate::identifier::Identifier;
use crate::types::TypeDecl;
use serpentc_diagnostics::SourceLocation;

/// The fixed operator vocabulary of spec.md §4.3. Boolean operators and the
/// numeric/relational operators participating in implicit coercion (§4.3
/// "Implicit numeric coercion") are kept in one enum because the source
/// grammar does not distinguish them syntactically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOperator {
    Plus,
    Minus,
    Product,
    Quotient,
    IntegerQuotient,
    IntegerRemainder,
    Power,
    IsLess,
    IsLessEqual,
    IsGreaterEqual,
    IsGreater,
    IsEqual,
    IsNotEqual,
    And,
    Or,
    AndThen,
    OrElse,
    Xor,
    Implies,
}

impl BinaryOperator {
    /// Operators eligible for the INTEGER/REAL coercion rule (§4.3).
    pub fn participates_in_numeric_coercion(self) -> bool {
        use BinaryOperator::*;
        matches!(
            self,
            Plus | Minus
                | Product
                | Quotient
                | IntegerQuotient
                | IntegerRemainder
                | Power
                | IsLess
                | IsLessEqual
                | IsGreaterEqual
                | IsGreater
                | IsEqual
                | IsNotEqual
        )
    }

    pub fn is_boolean_operator(self) -> bool {
        use BinaryOperator::*;
        matches!(self, And | Or | AndThen | OrElse | Xor | Implies)
    }

    pub fn is_relational(self) -> bool {
        use BinaryOperator::*;
        matches!(
            self,
            IsLess | IsLessEqual | IsGreaterEqual | IsGreater | IsEqual | IsNotEqual
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Expr {
    IntegerLiteral {
        value: i64,
        #[serde(default)]
        location: Option<SourceLocation>,
    },
    RealLiteral {
        value: f64,
        #[serde(default)]
        location: Option<SourceLocation>,
    },
    CharacterLiteral {
        value: char,
        #[serde(default)]
        location: Option<SourceLocation>,
    },
    StringLiteral {
        value: String,
        #[serde(default)]
        location: Option<SourceLocation>,
    },
    BoolLiteral {
        value: bool,
        #[serde(default)]
        location: Option<SourceLocation>,
    },
    VoidLiteral {
        #[serde(default)]
        location: Option<SourceLocation>,
    },
    Current {
        #[serde(default)]
        location: Option<SourceLocation>,
    },
    Variable {
        name: Identifier,
        #[serde(default)]
        location: Option<SourceLocation>,
    },
    FeatureCall {
        receiver: Option<Box<Expr>>,
        name: Identifier,
        #[serde(default)]
        arguments: Vec<Expr>,
        #[serde(default)]
        location: Option<SourceLocation>,
    },
    PrecursorCall {
        /// The ancestor class disambiguating which original body is meant,
        /// required only when more than one parent defines the feature
        /// being redefined (§4.3 "Precursor call").
        ancestor: Option<Identifier>,
        #[serde(default)]
        arguments: Vec<Expr>,
        #[serde(default)]
        location: Option<SourceLocation>,
    },
    CreateExpr {
        type_decl: TypeDecl,
        constructor: Identifier,
        #[serde(default)]
        arguments: Vec<Expr>,
        #[serde(default)]
        location: Option<SourceLocation>,
    },
    BinaryOp {
        operator: BinaryOperator,
        left: Box<Expr>,
        right: Box<Expr>,
        #[serde(default)]
        location: Option<SourceLocation>,
    },
    UnaryNot {
        argument: Box<Expr>,
        #[serde(default)]
        location: Option<SourceLocation>,
    },
}

impl Expr {
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            Expr::IntegerLiteral { location, .. }
            | Expr::RealLiteral { location, .. }
            | Expr::CharacterLiteral { location, .. }
            | Expr::StringLiteral { location, .. }
            | Expr::BoolLiteral { location, .. }
            | Expr::VoidLiteral { location }
            | Expr::Current { location }
            | Expr::Variable { location, .. }
            | Expr::FeatureCall { location, .. }
            | Expr::PrecursorCall { location, .. }
            | Expr::CreateExpr { location, .. }
            | Expr::BinaryOp { location, .. }
            | Expr::UnaryNot { location, .. } => location.as_ref(),
        }
    }
}
