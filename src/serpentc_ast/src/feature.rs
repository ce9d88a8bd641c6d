use serde::{Deserialize, Serialize};

use crate::identifier::Identifier;
use crate::stmt::Stmt;
use crate::types::TypeDecl;
use serpentc_diagnostics::SourceLocation;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    pub name: Identifier,
    pub type_decl: TypeDecl,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalDecl {
    pub name: Identifier,
    pub type_decl: TypeDecl,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LiteralValue {
    Integer(i64),
    Real(f64),
    Character(char),
    String(String),
    Bool(bool),
    Void,
}

/// One of the four feature kinds a class can declare (spec.md §3). `Field`
/// and `Constant` are attributes; `Method` and `ExternalMethod` are
/// routines (functions if `return_type.is_some()`, procedures otherwise).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Feature {
    Field {
        name: Identifier,
        type_decl: TypeDecl,
        #[serde(default)]
        location: Option<SourceLocation>,
    },
    Constant {
        name: Identifier,
        type_decl: TypeDecl,
        value: LiteralValue,
        #[serde(default)]
        location: Option<SourceLocation>,
    },
    Method {
        name: Identifier,
        #[serde(default)]
        parameters: Vec<Parameter>,
        return_type: Option<TypeDecl>,
        #[serde(default)]
        locals: Vec<LocalDecl>,
        #[serde(default)]
        body: Vec<Stmt>,
        #[serde(default)]
        location: Option<SourceLocation>,
    },
    ExternalMethod {
        name: Identifier,
        #[serde(default)]
        parameters: Vec<Parameter>,
        return_type: Option<TypeDecl>,
        /// §3: "host-language tag" — e.g. `"Java"` for the reference
        /// target VM. Used only for diagnostics; the alias is what drives
        /// emission (§4.6 "For host-runtime interop").
        host_language: String,
        /// Fully-qualified alias into the host runtime, e.g.
        /// `"com.eiffel.base.Any.write"` (§4.6, §C.2 of SPEC_FULL.md).
        alias: String,
        #[serde(default)]
        location: Option<SourceLocation>,
    },
}

impl Feature {
    pub fn name(&self) -> &Identifier {
        match self {
            Feature::Field { name, .. }
            | Feature::Constant { name, .. }
            | Feature::Method { name, .. }
            | Feature::ExternalMethod { name, .. } => name,
        }
    }

    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            Feature::Field { location, .. }
            | Feature::Constant { location, .. }
            | Feature::Method { location, .. }
            | Feature::ExternalMethod { location, .. } => location.as_ref(),
        }
    }

    pub fn is_routine(&self) -> bool {
        matches!(self, Feature::Method { .. } | Feature::ExternalMethod { .. })
    }

    pub fn is_function(&self) -> bool {
        match self {
            Feature::Method { return_type, .. }
            | Feature::ExternalMethod { return_type, .. } => return_type.is_some(),
            _ => false,
        }
    }

    pub fn declared_type(&self) -> Option<&TypeDecl> {
        match self {
            Feature::Field { type_decl, .. } | Feature::Constant { type_decl, .. } => {
                Some(type_decl)
            }
            Feature::Method { return_type, .. }
            | Feature::ExternalMethod { return_type, .. } => return_type.as_ref(),
        }
    }

    pub fn parameters(&self) -> &[Parameter] {
        match self {
            Feature::Method { parameters, .. } | Feature::ExternalMethod { parameters, .. } => {
                parameters
            }
            _ => &[],
        }
    }
}
