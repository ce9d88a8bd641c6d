//! Inheritance flattening (spec.md §2 component #3, §4.1): resolves each
//! class into one table of features with rename/redefine/undefine/select/
//! precursor rules applied.

pub mod flatten;
pub mod table;

use std::collections::HashMap;

use log::debug;
use petgraph::algo::toposort;
use petgraph::graph::DiGraph;
use petgraph::Direction;

use serpentc_ast::{Program, TypeDecl};
use serpentc_diagnostics::DiagnosticCollection;

pub use flatten::flatten_class;
pub use table::{Category, FeatureEntry, FlattenClass};

/// Flattens every class in the program, parents before children, so a
/// child's flattening can read its parents' already-resolved tables.
/// Assumes `serpentc_examine::examine` already rejected inheritance
/// cycles; classes with an unresolvable parent are flattened with that
/// parent simply absent (the flattener itself reports the error).
pub fn flatten_program(program: &Program) -> (HashMap<String, FlattenClass>, DiagnosticCollection) {
    let mut diags = DiagnosticCollection::new();
    let order = topological_class_order(program);

    let mut flattened: HashMap<String, FlattenClass> = HashMap::new();
    for class_name in order {
        let Some(class) = program.find_class(&class_name) else {
            continue;
        };
        debug!("flattening {class_name}");
        let flat = flatten_class(class, &flattened, &mut diags);
        flattened.insert(class_name, flat);
    }

    (flattened, diags)
}

/// Parents-before-children order. Falls back to declaration order for any
/// class petgraph's toposort can't place (e.g. it participates in a cycle
/// that `serpentc_examine` should already have reported).
fn topological_class_order(program: &Program) -> Vec<String> {
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
                    // edge child -> parent; we want parents first, so
                    // reverse the topological order of this graph.
                    graph.add_edge(from, to, ());
                }
            }
        }
    }

    match toposort(&graph, None) {
        Ok(mut order) => {
            order.reverse();
            order.into_iter().map(|idx| graph[idx].to_string()).collect()
        }
        Err(_) => {
            // A cycle exists; fall back to declaration order rather than
            // panicking. `serpentc_examine` is expected to have already
            // stopped the pipeline before this point.
            program.classes.iter().map(|c| c.name.to_string()).collect()
        }
    }
}

/// Number of distinct immediate parents a class declares, useful for
/// diagnostics and for the symbol-table builder's generic work list.
pub fn parent_count(graph: &DiGraph<&str, ()>, node: petgraph::graph::NodeIndex) -> usize {
    graph.neighbors_directed(node, Direction::Outgoing).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serpentc_ast::*;

    fn feature_clause(features: Vec<Feature>) -> FeatureClause {
        FeatureClause {
            clients: ClientSpec::All,
            features,
        }
    }

    fn method(name: &str, return_type: Option<TypeDecl>, body: Vec<Stmt>) -> Feature {
        Feature::Method {
            name: Identifier::new(name),
            parameters: vec![],
            return_type,
            locals: vec![],
            body,
            location: None,
        }
    }

    fn string_return(value: &str) -> Vec<Stmt> {
        vec![Stmt::Assignment {
            lhs: Expr::Variable {
                name: Identifier::new("Result"),
                location: None,
            },
            rhs: Expr::StringLiteral {
                value: value.to_string(),
                location: None,
            },
            location: None,
        }]
    }

    #[test]
    fn redefinition_keeps_a_precursor_handle() {
        // class A feature f: STRING do Result := "A" end end
        let a = SourceClass {
            name: Identifier::new("A"),
            generic_formals: vec![],
            inherits: vec![],
            creation: vec![],
            feature_clauses: vec![feature_clause(vec![method(
                "f",
                Some(TypeDecl::concrete("STRING")),
                string_return("A"),
            )])],
            is_general: false,
            location: None,
        };

        // class B inherit A redefine f end feature f: STRING do Result := Precursor + "B" end end
        let b = SourceClass {
            name: Identifier::new("B"),
            generic_formals: vec![],
            inherits: vec![InheritanceClause {
                parent: TypeDecl::concrete("A"),
                rename: vec![],
                redefine: vec![Identifier::new("f")],
                undefine: vec![],
                select: vec![],
                export: vec![],
            }],
            creation: vec![],
            feature_clauses: vec![feature_clause(vec![method(
                "f",
                Some(TypeDecl::concrete("STRING")),
                string_return("AB"),
            )])],
            is_general: false,
            location: None,
        };

        let program = Program {
            classes: vec![a, b],
            main_class: None,
            main_routine: None,
        };

        let (flattened, diags) = flatten_program(&program);
        assert!(!diags.has_errors(), "{:?}", diags.diagnostics);

        let b_flat = &flattened["B"];
        assert!(matches!(b_flat.get("f").unwrap().category, Category::Redefined));
        assert!(b_flat.precursors.contains_key("Precursor_A_B_f"));
    }

    #[test]
    fn diamond_without_select_is_ambiguous() {
        let a = SourceClass {
            name: Identifier::new("A"),
            generic_formals: vec![],
            inherits: vec![],
            creation: vec![],
            feature_clauses: vec![feature_clause(vec![method(
                "f",
                Some(TypeDecl::concrete("STRING")),
                string_return("A"),
            )])],
            is_general: false,
            location: None,
        };
        let make_child = |name: &str, redefine: bool, body: &str| SourceClass {
            name: Identifier::new(name),
            generic_formals: vec![],
            inherits: vec![InheritanceClause {
                parent: TypeDecl::concrete("A"),
                rename: vec![],
                redefine: if redefine {
                    vec![Identifier::new("f")]
                } else {
                    vec![]
                },
                undefine: vec![],
                select: vec![],
                export: vec![],
            }],
            creation: vec![],
            feature_clauses: if redefine {
                vec![feature_clause(vec![method(
                    "f",
                    Some(TypeDecl::concrete("STRING")),
                    string_return(body),
                )])]
            } else {
                vec![]
            },
            is_general: false,
            location: None,
        };
        let b = make_child("B", true, "B");
        let c = make_child("C", true, "C");

        let d = SourceClass {
            name: Identifier::new("D"),
            generic_formals: vec![],
            inherits: vec![
                InheritanceClause {
                    parent: TypeDecl::concrete("B"),
                    rename: vec![],
                    redefine: vec![],
                    undefine: vec![],
                    select: vec![],
                    export: vec![],
                },
                InheritanceClause {
                    parent: TypeDecl::concrete("C"),
                    rename: vec![],
                    redefine: vec![],
                    undefine: vec![],
                    select: vec![],
                    export: vec![],
                },
            ],
            creation: vec![],
            feature_clauses: vec![],
            is_general: false,
            location: None,
        };

        let program = Program {
            classes: vec![a, b, c, d],
            main_class: None,
            main_routine: None,
        };
        let (_flattened, diags) = flatten_program(&program);
        assert!(diags
            .errors()
            .any(|e| matches!(e.code, serpentc_diagnostics::DiagnosticCode::IE2004AmbiguousFeatureNoSelect)));
    }

    #[test]
    fn diamond_with_select_picks_the_named_parent() {
        let a = SourceClass {
            name: Identifier::new("A"),
            generic_formals: vec![],
            inherits: vec![],
            creation: vec![],
            feature_clauses: vec![feature_clause(vec![method(
                "f",
                Some(TypeDecl::concrete("STRING")),
                string_return("A"),
            )])],
            is_general: false,
            location: None,
        };
        let make_child = |name: &str, body: &str| SourceClass {
            name: Identifier::new(name),
            generic_formals: vec![],
            inherits: vec![InheritanceClause {
                parent: TypeDecl::concrete("A"),
                rename: vec![],
                redefine: vec![Identifier::new("f")],
                undefine: vec![],
                select: vec![],
                export: vec![],
            }],
            creation: vec![],
            feature_clauses: vec![feature_clause(vec![method(
                "f",
                Some(TypeDecl::concrete("STRING")),
                string_return(body),
            )])],
            is_general: false,
            location: None,
        };
        let b = make_child("B", "B");
        let c = make_child("C", "C");

        let d = SourceClass {
            name: Identifier::new("D"),
            generic_formals: vec![],
            inherits: vec![
                InheritanceClause {
                    parent: TypeDecl::concrete("B"),
                    rename: vec![],
                    redefine: vec![],
                    undefine: vec![],
                    select: vec![Identifier::new("f")],
                    export: vec![],
                },
                InheritanceClause {
                    parent: TypeDecl::concrete("C"),
                    rename: vec![],
                    redefine: vec![],
                    undefine: vec![],
                    select: vec![],
                    export: vec![],
                },
            ],
            creation: vec![],
            feature_clauses: vec![],
            is_general: false,
            location: None,
        };

        let program = Program {
            classes: vec![a, b, c, d],
            main_class: None,
            main_routine: None,
        };
        let (flattened, diags) = flatten_program(&program);
        assert!(!diags.has_errors(), "{:?}", diags.diagnostics);
        let d_flat = &flattened["D"];
        assert_eq!(d_flat.get("f").unwrap().origin_class, "B");
        assert!(d_flat.selected_losers.contains_key("f"));
    }
}
