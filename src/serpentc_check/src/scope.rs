use std::collections::HashMap;

use serpentc_ast::{Parameter, ResolvedType};
use serpentc_diagnostics::{DiagnosticCode, DiagnosticCollection, Phase, SourceLocation};
use serpentc_flatten::FlattenClass;
use serpentc_symbols::mangle_local;

/// Everything local to one method body being checked: its class's own
/// resolved type, the generic-formal substitution in effect, and the
/// locals/parameters visible by their mangled name.
pub struct MethodScope {
    pub class_type: ResolvedType,
    pub current_class_name: String,
    pub current_feature_name: String,
    pub is_function: bool,
    pub inside_redefine: bool,
    pub generics: HashMap<String, ResolvedType>,
    pub locals: HashMap<String, ResolvedType>,
}

impl MethodScope {
    pub fn lookup_local(&self, mangled_name: &str) -> Option<&ResolvedType> {
        self.locals.get(mangled_name)
    }
}

/// Registers a parameter/local under its mangled name, reporting
/// `NE3001LocalCollidesWithFeature` if its *unmangled* name collides with a
/// feature of the enclosing class (spec.md §4.2 "Parameter/local
/// scoping").
pub fn register_local(
    scope: &mut MethodScope,
    flat: &FlattenClass,
    raw_name: &str,
    ty: ResolvedType,
    location: Option<SourceLocation>,
    diags: &mut DiagnosticCollection,
) {
    if flat.entries.contains_key(raw_name) {
        diags.add_error(
            Phase::Naming,
            DiagnosticCode::NE3001LocalCollidesWithFeature,
            location,
            format!(
                "`{}` in `{}` collides with a feature of the same name",
                raw_name, scope.current_class_name
            ),
        );
    }
    scope.locals.insert(mangle_local(raw_name), ty);
}

pub fn register_parameters(
    scope: &mut MethodScope,
    flat: &FlattenClass,
    parameters: &[Parameter],
    resolve: impl Fn(&serpentc_ast::TypeDecl) -> ResolvedType,
    diags: &mut DiagnosticCollection,
) {
    for param in parameters {
        let ty = resolve(&param.type_decl);
        register_local(scope, flat, param.name.as_str(), ty, None, diags);
    }
}
