//! System examiner (spec.md §2 component #2): global sanity checks that
//! must hold before inheritance flattening (component #3) is allowed to
//! run over the whole program. These are "system errors" in the §7 error
//! taxonomy.

use std::collections::HashMap;

use log::debug;
use petgraph::algo::toposort;
use petgraph::graph::DiGraph;

use serpentc_ast::{Program, TypeDecl};
use serpentc_diagnostics::{DiagnosticCode, DiagnosticCollection, Phase};

/// Runs every global check and returns the diagnostics collected. The
/// caller (the CLI's `build` pipeline) stops before flattening if
/// `has_errors()` is true, per spec.md §5's phase-boundary cancellation
/// model.
pub fn examine(program: &Program) -> DiagnosticCollection {
    let mut diags = DiagnosticCollection::new();
    debug!("examining {} classes", program.classes.len());

    check_unique_class_names(program, &mut diags);
    check_root_class_present(program, &mut diags);
    check_inheritance_acyclic(program, &mut diags);

    diags
}

fn check_unique_class_names(program: &Program, diags: &mut DiagnosticCollection) {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for class in &program.classes {
        *seen.entry(class.name.as_str()).or_insert(0) += 1;
    }
    for class in &program.classes {
        if seen[class.name.as_str()] > 1 {
            diags.add_error(
                Phase::System,
                DiagnosticCode::SE1001DuplicateClassName,
                class.location.clone(),
                format!("class `{}` is declared more than once", class.name),
            );
        }
    }
}

fn check_root_class_present(program: &Program, diags: &mut DiagnosticCollection) {
    let root_candidates: Vec<_> = program.classes.iter().filter(|c| c.is_general).collect();
    match root_candidates.len() {
        0 => diags.add_error(
            Phase::System,
            DiagnosticCode::SE1002MissingRootClass,
            None,
            "no class is marked as the program's GENERAL ancestor; the synthesized root class \
             has nothing to bridge to (spec.md §4.8)",
        ),
        1 => {}
        _ => {
            for class in root_candidates {
                diags.add_error(
                    Phase::System,
                    DiagnosticCode::SE1002MissingRootClass,
                    class.location.clone(),
                    "more than one class is marked as the program's GENERAL ancestor",
                );
            }
        }
    }
}

/// Builds a directed graph of class -> parent-class and rejects it if it
/// contains a cycle, since the flattener (spec.md §4.1) walks parents
/// assuming the inheritance DAG terminates.
fn check_inheritance_acyclic(program: &Program, diags: &mut DiagnosticCollection) {
    let mut graph = DiGraph::<&str, ()>::new();
    let mut index_of = HashMap::new();
    for class in &program.classes {
        let idx = graph.add_node(class.name.as_str());
        index_of.insert(class.name.as_str(), idx);
    }

    for class in &program.classes {
        let Some(&from) = index_of.get(class.name.as_str()) else {
            continue;
        };
        for clause in &class.inherits {
            if let TypeDecl::Concrete { class_name, .. } = &clause.parent {
                if let Some(&to) = index_of.get(class_name.as_str()) {
                    graph.add_edge(from, to, ());
                }
            }
        }
    }

    if toposort(&graph, None).is_err() {
        diags.add_error(
            Phase::System,
            DiagnosticCode::SE1003InheritanceCycle,
            None,
            "the inheritance graph contains a cycle",
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serpentc_ast::{ClientSpec, FeatureClause, Identifier, InheritanceClause, SourceClass};

    fn class(name: &str, parents: &[&str], is_general: bool) -> SourceClass {
        SourceClass {
            name: Identifier::new(name),
            generic_formals: vec![],
            inherits: parents
                .iter()
                .map(|p| InheritanceClause {
                    parent: TypeDecl::concrete(*p),
                    rename: vec![],
                    redefine: vec![],
                    undefine: vec![],
                    select: vec![],
                    export: vec![],
                })
                .collect(),
            creation: vec![],
            feature_clauses: vec![FeatureClause {
                clients: ClientSpec::All,
                features: vec![],
            }],
            is_general,
            location: None,
        }
    }

    #[test]
    fn flags_duplicate_class_names() {
        let program = Program {
            classes: vec![class("A", &[], true), class("A", &[], false)],
            main_class: None,
            main_routine: None,
        };
        let diags = examine(&program);
        assert_eq!(diags.error_count(), 1);
        assert!(matches!(
            diags.errors().next().unwrap().code,
            DiagnosticCode::SE1001DuplicateClassName
        ));
    }

    #[test]
    fn flags_missing_root_class() {
        let program = Program {
            classes: vec![class("A", &[], false)],
            main_class: None,
            main_routine: None,
        };
        let diags = examine(&program);
        assert!(diags
            .errors()
            .any(|d| matches!(d.code, DiagnosticCode::SE1002MissingRootClass)));
    }

    #[test]
    fn flags_inheritance_cycles() {
        let program = Program {
            classes: vec![
                class("GENERAL", &[], true),
                class("A", &["B"], false),
                class("B", &["A"], false),
            ],
            main_class: None,
            main_routine: None,
        };
        let diags = examine(&program);
        assert!(diags
            .errors()
            .any(|d| matches!(d.code, DiagnosticCode::SE1003InheritanceCycle)));
    }

    #[test]
    fn accepts_a_well_formed_program() {
        let program = Program {
            classes: vec![class("GENERAL", &[], true), class("A", &["GENERAL"], false)],
            main_class: None,
            main_routine: None,
        };
        let diags = examine(&program);
        assert!(!diags.has_errors());
    }
}
