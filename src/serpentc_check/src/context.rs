use std::collections::{HashMap, HashSet};

use serpentc_ast::{Program, ResolvedType};
use serpentc_flatten::FlattenClass;
use serpentc_symbols::{build_class_symbol_table, ClassSymbolTable, InstantiationWorklist};

/// Program-wide state threaded through type checking: the per-class
/// flattened tables (read-only, built once per spec.md §3 "Lifecycles"),
/// the ancestor closure for conformance, and the lazily-populated symbol
/// table cache plus generic-instantiation worklist.
pub struct CheckContext<'a> {
    pub program: &'a Program,
    pub flattened: &'a HashMap<String, FlattenClass>,
    pub ancestors: &'a HashMap<String, HashSet<String>>,
    pub worklist: InstantiationWorklist,
    symbol_tables: HashMap<ResolvedType, ClassSymbolTable>,
}

impl<'a> CheckContext<'a> {
    pub fn new(
        program: &'a Program,
        flattened: &'a HashMap<String, FlattenClass>,
        ancestors: &'a HashMap<String, HashSet<String>>,
    ) -> Self {
        Self {
            program,
            flattened,
            ancestors,
            worklist: InstantiationWorklist::new(),
            symbol_tables: HashMap::new(),
        }
    }

    /// Builds (or returns the cached) `ClassSymbolTable` for `resolved`,
    /// the on-demand materialization spec.md §3 describes ("Symbol tables
    /// for generic instantiations are materialized lazily the first time a
    /// type is mentioned").
    pub fn symbol_table_for(
        &mut self,
        resolved: &ResolvedType,
        diags: &mut serpentc_diagnostics::DiagnosticCollection,
    ) -> Option<&ClassSymbolTable> {
        if !self.symbol_tables.contains_key(resolved) {
            let source_class = self.program.find_class(resolved.name())?;
            let flat = self.flattened.get(resolved.name())?;
            let table = build_class_symbol_table(resolved, source_class, flat, &mut self.worklist, diags);
            self.symbol_tables.insert(resolved.clone(), table);
        }
        self.symbol_tables.get(resolved)
    }

    pub fn conforms(&self, sub: &ResolvedType, sup: &ResolvedType) -> bool {
        crate::conform::conforms(sub, sup, self.ancestors)
    }
}
