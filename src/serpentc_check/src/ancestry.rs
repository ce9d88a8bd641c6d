use std::collections::{HashMap, HashSet};

use serpentc_ast::{Program, TypeDecl};

/// Transitive closure of each class's ancestors (including itself),
/// computed once from the raw inheritance lists so `conforms` (spec.md §3
/// "Conformance (subtyping)") doesn't have to re-walk the graph per call.
pub fn build_ancestors(program: &Program) -> HashMap<String, HashSet<String>> {
    let mut direct_parents: HashMap<&str, Vec<&str>> = HashMap::new();
    for class in &program.classes {
        let parents = class
            .inherits
            .iter()
            .filter_map(|clause| match &clause.parent {
                TypeDecl::Concrete { class_name, .. } => Some(class_name.as_str()),
                _ => None,
            })
            .collect();
        direct_parents.insert(class.name.as_str(), parents);
    }

    let mut ancestors: HashMap<String, HashSet<String>> = HashMap::new();
    for class in &program.classes {
        let mut closure = HashSet::new();
        let mut stack = vec![class.name.as_str()];
        while let Some(name) = stack.pop() {
            if !closure.insert(name.to_string()) {
                continue;
            }
            if let Some(parents) = direct_parents.get(name) {
                stack.extend(parents.iter().copied());
            }
        }
        ancestors.insert(class.name.to_string(), closure);
    }
    ancestors
}
