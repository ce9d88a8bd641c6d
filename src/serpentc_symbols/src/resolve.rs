use std::collections::HashMap;

use serpentc_ast::{ResolvedType, TypeDecl};
use serpentc_diagnostics::{DiagnosticCode, DiagnosticCollection, Phase, SourceLocation};
use serpentc_flatten::FlattenClass;

/// One feature whose declared value type still needs anchor resolution.
struct PendingAnchor<'a> {
    feature_name: String,
    anchor: &'a str,
    location: Option<SourceLocation>,
}

/// Resolves the declared value type of every feature that has one (spec.md
/// §4.2 "Anchored-type resolution"). Returns a map from the feature's
/// *unmangled* name (the anchor target names used in `like <feature>` are
/// unmangled feature names) to its resolved type.
///
/// Features whose anchor never resolves (a cycle) are reported once, with
/// every member of the cycle named, and are left out of the returned map.
pub fn resolve_value_types(
    flat: &FlattenClass,
    declared: impl Fn(&str) -> Option<TypeDecl>,
    current: &ResolvedType,
    generic_map: &HashMap<String, ResolvedType>,
    diags: &mut DiagnosticCollection,
) -> HashMap<String, ResolvedType> {
    let mut resolved: HashMap<String, ResolvedType> = HashMap::new();
    let mut deferred: Vec<PendingAnchor> = Vec::new();

    for name in flat.entries.keys() {
        let Some(type_decl) = declared(name) else {
            continue;
        };
        match &type_decl {
            TypeDecl::LikeCurrent => {
                resolved.insert(name.clone(), current.clone());
            }
            TypeDecl::Concrete { .. } => {
                resolved.insert(name.clone(), substitute(&type_decl, generic_map, current));
            }
            TypeDecl::LikeFeature { feature_name } => {
                deferred.push(PendingAnchor {
                    feature_name: name.clone(),
                    anchor: feature_name.as_str(),
                    location: flat.get(name).and_then(|e| e.feature.location()).cloned(),
                });
            }
        }
    }

    loop {
        let mut made_progress = false;
        let mut still_pending = Vec::new();
        for pending in deferred {
            if let Some(anchor_type) = resolved.get(pending.anchor).cloned() {
                resolved.insert(pending.feature_name.clone(), anchor_type);
                made_progress = true;
            } else {
                still_pending.push(pending);
            }
        }
        deferred = still_pending;
        if deferred.is_empty() || !made_progress {
            break;
        }
    }

    if !deferred.is_empty() {
        let names: Vec<&str> = deferred.iter().map(|p| p.feature_name.as_str()).collect();
        let location = deferred.iter().find_map(|p| p.location.clone());
        diags.add_error(
            Phase::Type,
            DiagnosticCode::TE4007AnchoredTypeCycle,
            location,
            format!(
                "anchored type cycle among features: {}",
                names.join(", ")
            ),
        );
    }

    resolved
}

/// Substitutes generic formals and binds `like Current` for a type
/// declaration already known not to be an unresolved `like <feature>`
/// anchor.
pub fn substitute(
    type_decl: &TypeDecl,
    generic_map: &HashMap<String, ResolvedType>,
    current: &ResolvedType,
) -> ResolvedType {
    match type_decl {
        TypeDecl::LikeCurrent => current.clone(),
        TypeDecl::LikeFeature { .. } => {
            // Callers resolve `like <feature>` anchors themselves before
            // reaching here; falling back to `current` keeps this total
            // rather than partial.
            current.clone()
        }
        TypeDecl::Concrete { class_name, actuals } => {
            if let Some(actual) = generic_map.get(class_name.as_str()) {
                return actual.clone();
            }
            ResolvedType {
                class_name: class_name.clone(),
                actuals: actuals
                    .iter()
                    .map(|a| substitute(a, generic_map, current))
                    .collect(),
            }
        }
    }
}
