use std::collections::HashMap;
use std::rc::Rc;

use serpentc_ast::{SourceClass, TypeDecl};
use serpentc_diagnostics::{DiagnosticCode, DiagnosticCollection, Phase};

use crate::table::{Category, FeatureEntry, FlattenClass};

/// One contribution of a feature to the class being flattened, collected
/// before rename/select are resolved: the feature as it existed in the
/// parent, the name it would carry in the child (post rename), and which
/// `inherit` clause (hence which parent) it came through.
struct Contribution {
    clause_index: usize,
    final_name: String,
    entry: FeatureEntry,
}

/// Flattens one source class given its parents' already-flattened tables.
/// Parents must be flattened first; `flatten_program` establishes that
/// order topologically.
pub fn flatten_class(
    class: &SourceClass,
    parents: &HashMap<String, FlattenClass>,
    diags: &mut DiagnosticCollection,
) -> FlattenClass {
    let mut result = FlattenClass {
        class_name: class.name.to_string(),
        ..Default::default()
    };

    let contributions = collect_contributions(class, parents, diags);
    resolve_contributions(class, contributions, &mut result, diags);
    apply_redefine(class, &mut result, diags);
    apply_undefine(class, &mut result, diags);
    apply_own(class, &mut result, diags);
    apply_constructors(class, &mut result, diags);

    result
}

fn collect_contributions(
    class: &SourceClass,
    parents: &HashMap<String, FlattenClass>,
    diags: &mut DiagnosticCollection,
) -> Vec<Contribution> {
    let mut contributions = Vec::new();

    for (clause_index, clause) in class.inherits.iter().enumerate() {
        let TypeDecl::Concrete { class_name, .. } = &clause.parent else {
            continue;
        };
        let Some(parent_flat) = parents.get(class_name.as_str()) else {
            diags.add_error(
                Phase::Inheritance,
                DiagnosticCode::NE3002UnknownClientClass,
                class.location.clone(),
                format!("class `{}` inherits from unknown class `{}`", class.name, class_name),
            );
            continue;
        };

        for (orig_name, entry) in &parent_flat.entries {
            let final_name = clause
                .rename
                .iter()
                .find(|r| r.from.as_str() == orig_name)
                .map(|r| r.to.to_string())
                .unwrap_or_else(|| orig_name.clone());

            contributions.push(Contribution {
                clause_index,
                final_name,
                entry: FeatureEntry {
                    category: Category::Inherited,
                    origin_class: entry.origin_class.clone(),
                    via_parent: Some(class_name.to_string()),
                    feature: Rc::clone(&entry.feature),
                    clients: entry.clients.clone(),
                },
            });
        }

        for name in &clause.rename {
            if !parent_flat.entries.contains_key(name.from.as_str()) {
                diags.add_error(
                    Phase::Inheritance,
                    DiagnosticCode::IE2002UnknownRenameTarget,
                    class.location.clone(),
                    format!(
                        "class `{}` renames unknown feature `{}` from `{}`",
                        class.name, name.from, class_name
                    ),
                );
            }
        }
    }

    contributions
}

fn resolve_contributions(
    class: &SourceClass,
    contributions: Vec<Contribution>,
    result: &mut FlattenClass,
    diags: &mut DiagnosticCollection,
) {
    let mut by_name: HashMap<String, Vec<Contribution>> = HashMap::new();
    for c in contributions {
        by_name.entry(c.final_name.clone()).or_default().push(c);
    }

    for (name, mut group) in by_name {
        if group.len() == 1 {
            let c = group.pop().unwrap();
            let mut entry = c.entry;
            if is_renamed_here(class, &c.clause_index, &name) {
                entry.category = Category::Renamed;
            }
            result.entries.insert(name, entry);
            continue;
        }

        // Multiple contributions under the same name: harmless if they
        // all trace back to one shared origin (diamond inheritance of an
        // untouched feature), otherwise a genuine conflict that needs
        // `select` (spec.md §4.1 rule 5).
        let first = &group[0];
        if group.iter().all(|c| c.entry.same_origin(&first.entry)) {
            let c = group.pop().unwrap();
            result.entries.insert(name, c.entry);
            continue;
        }

        let selecting: Vec<usize> = class
            .inherits
            .iter()
            .enumerate()
            .filter(|(_, clause)| clause.select.iter().any(|s| s.as_str() == name))
            .map(|(i, _)| i)
            .collect();

        let winners: Vec<usize> = group
            .iter()
            .enumerate()
            .filter(|(_, c)| selecting.contains(&c.clause_index))
            .map(|(i, _)| i)
            .collect();

        match winners.len() {
            0 => {
                diags.add_error(
                    Phase::Inheritance,
                    DiagnosticCode::IE2004AmbiguousFeatureNoSelect,
                    class.location.clone(),
                    format!(
                        "feature `{}` is inherited from multiple unrelated parents in `{}`; add a select clause",
                        name, class.name
                    ),
                );
                // Keep the first one so downstream phases still have
                // something to look at; the error already aborts before
                // the next pipeline phase runs.
                let c = group.pop().unwrap();
                result.entries.insert(name, c.entry);
            }
            1 => {
                let winner_idx = winners[0];
                let mut losers = Vec::new();
                for (i, c) in group.into_iter().enumerate() {
                    if i == winner_idx {
                        result.entries.insert(name.clone(), c.entry);
                    } else {
                        losers.push(c.entry);
                    }
                }
                if !losers.is_empty() {
                    result.selected_losers.insert(name, losers);
                }
            }
            _ => {
                diags.add_error(
                    Phase::Inheritance,
                    DiagnosticCode::IE2004AmbiguousFeatureNoSelect,
                    class.location.clone(),
                    format!(
                        "feature `{}` is selected from more than one parent in `{}`",
                        name, class.name
                    ),
                );
            }
        }
    }

    // A select clause naming a feature that ended up nowhere in the
    // flattened table — neither the winner nor a loser — never named an
    // inherited feature to begin with.
    for clause in &class.inherits {
        for name in &clause.select {
            let resolved = result.entries.contains_key(name.as_str())
                || result.selected_losers.contains_key(name.as_str());
            if !resolved {
                diags.add_error(
                    Phase::Inheritance,
                    DiagnosticCode::IE2005SelectOfNonInheritedName,
                    class.location.clone(),
                    format!("`select {}` does not name an inherited feature", name),
                );
            }
        }
    }
}

fn is_renamed_here(class: &SourceClass, clause_index: &usize, final_name: &str) -> bool {
    class
        .inherits
        .get(*clause_index)
        .map(|c| c.rename.iter().any(|r| r.to.as_str() == final_name))
        .unwrap_or(false)
}

fn apply_redefine(class: &SourceClass, result: &mut FlattenClass, diags: &mut DiagnosticCollection) {
    for clause in &class.inherits {
        let TypeDecl::Concrete { class_name, .. } = &clause.parent else {
            continue;
        };
        for name in &clause.redefine {
            match result.entries.remove(name.as_str()) {
                Some(old_entry) => {
                    let precursor_name = format!("Precursor_{}_{}_{}", class_name, class.name, name);
                    result.precursors.insert(precursor_name, old_entry.clone());
                    // The new body is installed by `apply_own`; until then
                    // mark the slot as redefined with the old body so a
                    // class that (invalidly) never supplies its own
                    // redefinition still has *a* body rather than a hole.
                    result.entries.insert(
                        name.to_string(),
                        FeatureEntry {
                            category: Category::Redefined,
                            ..old_entry
                        },
                    );
                }
                None => diags.add_error(
                    Phase::Inheritance,
                    DiagnosticCode::IE2003RedefineWithoutInherited,
                    class.location.clone(),
                    format!(
                        "`{}` redefines `{}` but does not inherit a feature of that name from `{}`",
                        class.name, name, class_name
                    ),
                ),
            }
        }
    }
}

fn apply_undefine(class: &SourceClass, result: &mut FlattenClass, diags: &mut DiagnosticCollection) {
    for clause in &class.inherits {
        for name in &clause.undefine {
            if result.entries.remove(name.as_str()).is_some() {
                result.undefined.insert(name.to_string());
            } else {
                diags.add_error(
                    Phase::Inheritance,
                    DiagnosticCode::IE2006UndefineWithoutInherited,
                    class.location.clone(),
                    format!("`{}` undefines unknown inherited feature `{}`", class.name, name),
                );
            }
        }
    }
}

fn apply_own(class: &SourceClass, result: &mut FlattenClass, diags: &mut DiagnosticCollection) {
    for clause in &class.feature_clauses {
        for feature in &clause.features {
            let name = feature.name().to_string();
            let is_redefinition = matches!(
                result.entries.get(&name).map(|e| e.category),
                Some(Category::Redefined)
            );
            let was_undefined = result.undefined.remove(&name);

            if !is_redefinition && !was_undefined && result.entries.contains_key(&name) {
                diags.add_error(
                    Phase::Inheritance,
                    DiagnosticCode::IE2001DuplicateFeatureName,
                    feature.location().cloned(),
                    format!(
                        "`{}` declares `{}` which collides with an inherited feature of the same name",
                        class.name, name
                    ),
                );
                continue;
            }

            result.entries.insert(
                name,
                FeatureEntry {
                    category: if is_redefinition {
                        Category::Redefined
                    } else {
                        Category::Own
                    },
                    origin_class: class.name.to_string(),
                    via_parent: None,
                    feature: Rc::new(feature.clone()),
                    clients: clause.clients.clone(),
                },
            );
        }
    }
}

fn apply_constructors(class: &SourceClass, result: &mut FlattenClass, diags: &mut DiagnosticCollection) {
    for name in &class.creation {
        if result.entries.contains_key(name.as_str()) {
            result.constructors.insert(name.to_string());
        } else {
            diags.add_error(
                Phase::Naming,
                DiagnosticCode::TE4012UnknownConstructor,
                class.location.clone(),
                format!("`{}` names unknown feature `{}` as a creation feature", class.name, name),
            );
        }
    }
}

