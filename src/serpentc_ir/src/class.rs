use serpentc_ast::ResolvedType;

use crate::stmt::TStmt;

#[derive(Debug, Clone)]
pub struct TField {
    pub mangled_name: String,
    pub ty: ResolvedType,
}

/// `TMethod` in its two shapes (spec.md §3 "Typed IR"): a body compiled
/// from source, or a bridge to the host runtime emitted without a body of
/// its own.
#[derive(Debug, Clone)]
pub enum TMethod {
    UserDefined {
        mangled_name: String,
        parameters: Vec<(String, ResolvedType)>,
        return_type: Option<ResolvedType>,
        locals: Vec<(String, ResolvedType)>,
        body: Vec<TStmt>,
        is_constructor: bool,
    },
    External {
        mangled_name: String,
        parameters: Vec<(String, ResolvedType)>,
        return_type: Option<ResolvedType>,
        host_language: String,
        alias: String,
    },
}

impl TMethod {
    pub fn mangled_name(&self) -> &str {
        match self {
            TMethod::UserDefined { mangled_name, .. } | TMethod::External { mangled_name, .. } => mangled_name,
        }
    }

    pub fn return_type(&self) -> Option<&ResolvedType> {
        match self {
            TMethod::UserDefined { return_type, .. } | TMethod::External { return_type, .. } => {
                return_type.as_ref()
            }
        }
    }

    pub fn parameters(&self) -> &[(String, ResolvedType)] {
        match self {
            TMethod::UserDefined { parameters, .. } | TMethod::External { parameters, .. } => parameters,
        }
    }

    pub fn is_constructor(&self) -> bool {
        matches!(self, TMethod::UserDefined { is_constructor: true, .. })
    }
}

/// One class ready for emission: either a compiled source class (or
/// generic instantiation of one) or the synthesized root (spec.md §4.5).
#[derive(Debug, Clone)]
pub struct TClass {
    pub name: String,
    pub super_class: String,
    pub fields: Vec<TField>,
    pub methods: Vec<TMethod>,
    pub is_root: bool,
}

impl TClass {
    pub fn find_method(&self, mangled_name: &str) -> Option<&TMethod> {
        self.methods.iter().find(|m| m.mangled_name() == mangled_name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct TProgram {
    pub classes: Vec<TClass>,
    pub main_class: Option<String>,
    pub main_routine: Option<String>,
}
