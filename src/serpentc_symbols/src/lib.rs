//! Class symbol tables (spec.md §2 component #4, §4.2): per resolved type,
//! the mangled-name member map a type checker and bytecode emitter can
//! query without re-walking the AST.

pub mod resolve;
pub mod table;
pub mod worklist;

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use serpentc_ast::{Feature, ResolvedType, SourceClass, TypeDecl};
use serpentc_diagnostics::DiagnosticCollection;
use serpentc_flatten::{Category, FlattenClass};

pub use table::{mangle, mangle_local, ClassSymbolTable, MemberInfo, NamedSlot};
pub use worklist::InstantiationWorklist;

/// Builds the `generic-formal -> generic-actual` map for one instantiation,
/// reporting nothing here (arity mismatches are a type-checking concern,
/// spec.md §4.3) but truncating defensively rather than panicking on a
/// malformed instantiation.
fn generic_map(source_class: &SourceClass, resolved_type: &ResolvedType) -> HashMap<String, ResolvedType> {
    source_class
        .generic_formals
        .iter()
        .zip(resolved_type.actuals.iter())
        .map(|(formal, actual)| (formal.to_string(), actual.clone()))
        .collect()
}

fn declared_value_type(feature: &Feature) -> Option<TypeDecl> {
    match feature {
        Feature::Field { type_decl, .. } | Feature::Constant { type_decl, .. } => Some(type_decl.clone()),
        Feature::Method { return_type, .. } | Feature::ExternalMethod { return_type, .. } => {
            return_type.clone()
        }
    }
}

/// Builds the `ClassSymbolTable` for one resolved (class, generic-actuals)
/// instantiation (spec.md §4.2). Every type mentioned along the way (a
/// field type, a parameter type, a return type) is recorded in `worklist`
/// so its own symbol table gets built in turn.
pub fn build_class_symbol_table(
    resolved_type: &ResolvedType,
    source_class: &SourceClass,
    flat: &FlattenClass,
    worklist: &mut InstantiationWorklist,
    diags: &mut DiagnosticCollection,
) -> ClassSymbolTable {
    let generics = generic_map(source_class, resolved_type);

    let value_types = resolve::resolve_value_types(
        flat,
        |name| flat.get(name).and_then(|e| declared_value_type(&e.feature)),
        resolved_type,
        &generics,
        diags,
    );

    let mut members = HashMap::new();
    let mut constructors = HashSet::new();
    let mut interface = HashSet::new();

    for (name, entry) in &flat.entries {
        let mangled = mangle(&resolved_type.class_name.to_string(), name);

        let parameters: Vec<NamedSlot> = entry
            .feature
            .parameters()
            .iter()
            .map(|p| {
                let resolved = resolve::substitute(&p.type_decl, &generics, resolved_type);
                record_mentions(&resolved, worklist);
                NamedSlot {
                    name: mangle_local(p.name.as_str()),
                    resolved_type: resolved,
                }
            })
            .collect();

        let mut locals: Vec<NamedSlot> = match entry.feature.as_ref() {
            Feature::Method { locals, .. } => locals
                .iter()
                .map(|l| {
                    let resolved = resolve::substitute(&l.type_decl, &generics, resolved_type);
                    record_mentions(&resolved, worklist);
                    NamedSlot {
                        name: mangle_local(l.name.as_str()),
                        resolved_type: resolved,
                    }
                })
                .collect(),
            _ => Vec::new(),
        };

        let declared_type = value_types.get(name).cloned();
        if let Some(t) = &declared_type {
            record_mentions(t, worklist);
        }

        if entry.feature.is_function() {
            if let Some(result_type) = declared_type.clone() {
                locals.push(NamedSlot {
                    name: mangle_local("Result"),
                    resolved_type: result_type,
                });
            }
        }

        if flat.constructors.contains(name) {
            constructors.insert(mangled.clone());
        }
        if matches!(entry.category, Category::Own | Category::Inherited | Category::Renamed | Category::Redefined) {
            interface.insert(mangled.clone());
        }

        members.insert(
            mangled,
            MemberInfo {
                declared_type,
                parameters,
                locals,
                feature: Rc::clone(&entry.feature),
                clients: entry.clients.clone(),
            },
        );
    }

    record_mentions(resolved_type, worklist);

    ClassSymbolTable {
        resolved_type: Some(resolved_type.clone()),
        members,
        constructors,
        interface,
        generic_formals_to_actuals: generics,
    }
}

fn record_mentions(resolved: &ResolvedType, worklist: &mut InstantiationWorklist) {
    if !resolved.actuals.is_empty() {
        worklist.record(resolved.clone());
    }
    for actual in &resolved.actuals {
        record_mentions(actual, worklist);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serpentc_ast::*;
    use serpentc_diagnostics::DiagnosticCode;
    use serpentc_flatten::flatten_class;

    fn field(name: &str, type_decl: TypeDecl) -> Feature {
        Feature::Field {
            name: Identifier::new(name),
            type_decl,
            location: None,
        }
    }

    #[test]
    fn resolves_like_current_to_the_instantiated_type() {
        let class = SourceClass {
            name: Identifier::new("BOX"),
            generic_formals: vec![],
            inherits: vec![],
            creation: vec![],
            feature_clauses: vec![FeatureClause {
                clients: ClientSpec::All,
                features: vec![field("self_ref", TypeDecl::LikeCurrent)],
            }],
            is_general: false,
            location: None,
        };
        let mut diags = DiagnosticCollection::new();
        let flat = flatten_class(&class, &HashMap::new(), &mut diags);
        assert!(!diags.has_errors());

        let mut worklist = InstantiationWorklist::new();
        let resolved_type = ResolvedType::simple("BOX");
        let table = build_class_symbol_table(&resolved_type, &class, &flat, &mut worklist, &mut diags);

        let member = table.get("BOX_self_ref").unwrap();
        assert_eq!(member.declared_type, Some(ResolvedType::simple("BOX")));
    }

    #[test]
    fn resolves_like_feature_through_a_chain() {
        // a: like Current ; b: like a  (b anchors through a to Current)
        let class = SourceClass {
            name: Identifier::new("NODE"),
            generic_formals: vec![],
            inherits: vec![],
            creation: vec![],
            feature_clauses: vec![FeatureClause {
                clients: ClientSpec::All,
                features: vec![
                    field("a", TypeDecl::LikeCurrent),
                    field(
                        "b",
                        TypeDecl::LikeFeature {
                            feature_name: Identifier::new("a"),
                        },
                    ),
                ],
            }],
            is_general: false,
            location: None,
        };
        let mut diags = DiagnosticCollection::new();
        let flat = flatten_class(&class, &HashMap::new(), &mut diags);
        assert!(!diags.has_errors());

        let mut worklist = InstantiationWorklist::new();
        let resolved_type = ResolvedType::simple("NODE");
        let table = build_class_symbol_table(&resolved_type, &class, &flat, &mut worklist, &mut diags);

        assert!(!diags.has_errors());
        assert_eq!(
            table.get("NODE_b").unwrap().declared_type,
            Some(ResolvedType::simple("NODE"))
        );
    }

    #[test]
    fn reports_a_cycle_among_anchored_features() {
        let class = SourceClass {
            name: Identifier::new("LOOP"),
            generic_formals: vec![],
            inherits: vec![],
            creation: vec![],
            feature_clauses: vec![FeatureClause {
                clients: ClientSpec::All,
                features: vec![
                    field(
                        "a",
                        TypeDecl::LikeFeature {
                            feature_name: Identifier::new("b"),
                        },
                    ),
                    field(
                        "b",
                        TypeDecl::LikeFeature {
                            feature_name: Identifier::new("a"),
                        },
                    ),
                ],
            }],
            is_general: false,
            location: None,
        };
        let mut diags = DiagnosticCollection::new();
        let flat = flatten_class(&class, &HashMap::new(), &mut diags);
        assert!(!diags.has_errors());

        let mut worklist = InstantiationWorklist::new();
        let resolved_type = ResolvedType::simple("LOOP");
        let _table = build_class_symbol_table(&resolved_type, &class, &flat, &mut worklist, &mut diags);

        assert!(diags
            .errors()
            .any(|d| matches!(d.code, DiagnosticCode::TE4007AnchoredTypeCycle)));
    }

    #[test]
    fn substitutes_a_generic_formal() {
        let class = SourceClass {
            name: Identifier::new("LIST"),
            generic_formals: vec![Identifier::new("G")],
            inherits: vec![],
            creation: vec![],
            feature_clauses: vec![FeatureClause {
                clients: ClientSpec::All,
                features: vec![field("item", TypeDecl::concrete("G"))],
            }],
            is_general: false,
            location: None,
        };
        let mut diags = DiagnosticCollection::new();
        let flat = flatten_class(&class, &HashMap::new(), &mut diags);

        let mut worklist = InstantiationWorklist::new();
        let resolved_type = ResolvedType {
            class_name: Identifier::new("LIST"),
            actuals: vec![ResolvedType::simple("INTEGER")],
        };
        let table = build_class_symbol_table(&resolved_type, &class, &flat, &mut worklist, &mut diags);

        assert_eq!(
            table.get("LIST_item").unwrap().declared_type,
            Some(ResolvedType::simple("INTEGER"))
        );
        assert!(worklist.all_seen().contains(&resolved_type));
    }
}
