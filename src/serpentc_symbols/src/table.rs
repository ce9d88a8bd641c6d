use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use serpentc_ast::{ClientSpec, Feature, ResolvedType};

/// An ordered (name, type) pair, used for both parameter lists and local
/// variable lists (spec.md §3 "ClassSymbolTable").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedSlot {
    pub name: String,
    pub resolved_type: ResolvedType,
}

/// Everything the type checker (component #5) needs about one mangled
/// feature name, already resolved for a specific generic instantiation.
#[derive(Debug, Clone)]
pub struct MemberInfo {
    pub declared_type: Option<ResolvedType>,
    pub parameters: Vec<NamedSlot>,
    /// Locals in declaration order, with the implicit `local_Result` slot
    /// appended for functions (spec.md §4.2 "Parameter/local scoping").
    pub locals: Vec<NamedSlot>,
    pub feature: Rc<Feature>,
    pub clients: ClientSpec,
}

/// The resolved symbol table for one (class, generic-actuals) instantiation
/// (spec.md §3 "ClassSymbolTable"). Built once, lazily, the first time a
/// type is mentioned (§3 "Lifecycles").
#[derive(Debug, Clone, Default)]
pub struct ClassSymbolTable {
    pub resolved_type: Option<ResolvedType>,
    pub members: HashMap<String, MemberInfo>,
    pub constructors: HashSet<String>,
    /// Externally-visible names: the subset of `members` callable by at
    /// least one client outside the defining class (spec.md §3 "interface
    /// names").
    pub interface: HashSet<String>,
    pub generic_formals_to_actuals: HashMap<String, ResolvedType>,
}

impl ClassSymbolTable {
    pub fn get(&self, mangled_name: &str) -> Option<&MemberInfo> {
        self.members.get(mangled_name)
    }

    pub fn is_interface_member(&self, mangled_name: &str) -> bool {
        self.interface.contains(mangled_name)
    }

    pub fn is_constructor(&self, mangled_name: &str) -> bool {
        self.constructors.contains(mangled_name)
    }
}

pub fn mangle(class_name: &str, feature_name: &str) -> String {
    format!("{class_name}_{feature_name}")
}

pub fn mangle_local(name: &str) -> String {
    format!("local_{name}")
}
