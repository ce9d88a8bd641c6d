use serde::{Deserialize, Serialize};

use crate::expr::Expr;
use crate::identifier::Identifier;
use crate::types::TypeDecl;
use serpentc_diagnostics::SourceLocation;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Stmt {
    Assignment {
        lhs: Expr,
        rhs: Expr,
        #[serde(default)]
        location: Option<SourceLocation>,
    },
    /// `target := create {T}.constructor(args)`, kept distinct from a bare
    /// assignment of a `CreateExpr` so later stages don't have to re-derive
    /// "this is a creation" from the RHS shape (spec.md §4.3 "Create
    /// statement").
    Create {
        target: Expr,
        type_decl: Option<TypeDecl>,
        constructor: Identifier,
        #[serde(default)]
        arguments: Vec<Expr>,
        #[serde(default)]
        location: Option<SourceLocation>,
    },
    If {
        /// `(condition, body)` pairs: the first is the `if` arm, the rest
        /// are `elseif` arms, in source order.
        arms: Vec<(Expr, Vec<Stmt>)>,
        #[serde(default)]
        else_branch: Vec<Stmt>,
        #[serde(default)]
        location: Option<SourceLocation>,
    },
    /// `from <init> until <guard> loop <body> end`. The guard is evaluated
    /// before every iteration; the loop exits once it becomes true
    /// (spec.md §4.3 "Until-loop").
    Until {
        init: Vec<Stmt>,
        guard: Expr,
        body: Vec<Stmt>,
        #[serde(default)]
        location: Option<SourceLocation>,
    },
    RoutineCall {
        call: Expr,
        #[serde(default)]
        location: Option<SourceLocation>,
    },
}

impl Stmt {
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            Stmt::Assignment { location, .. }
            | Stmt::Create { location, .. }
            | Stmt::If { location, .. }
            | Stmt::Until { location, .. }
            | Stmt::RoutineCall { location, .. } => location.as_ref(),
        }
    }
}
