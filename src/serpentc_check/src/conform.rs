use std::collections::{HashMap, HashSet};

use serpentc_ast::ResolvedType;

/// Spec.md §3: "`NONE` conforms to everything; otherwise the base class
/// must transitively inherit from the parent's base class, and, if the
/// parent specifies generic actuals, arities must match and actuals must
/// conform pairwise."
pub fn conforms(sub: &ResolvedType, sup: &ResolvedType, ancestors: &HashMap<String, HashSet<String>>) -> bool {
    if sub.is_none() {
        return true;
    }
    let base_conforms = ancestors
        .get(sub.name())
        .map(|closure| closure.contains(sup.name()))
        .unwrap_or_else(|| sub.name() == sup.name());
    if !base_conforms {
        return false;
    }
    if sup.actuals.is_empty() {
        return true;
    }
    if sub.actuals.len() != sup.actuals.len() {
        return false;
    }
    sub.actuals
        .iter()
        .zip(sup.actuals.iter())
        .all(|(s, p)| conforms(s, p, ancestors))
}
