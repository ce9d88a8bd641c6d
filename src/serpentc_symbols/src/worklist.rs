use std::collections::VecDeque;

use serpentc_ast::ResolvedType;

/// Every generic instantiation the program ever mentions, recorded as it is
/// discovered so code generation can later emit one class file per entry
/// (spec.md §4.2 "Generic substitution"). Also doubles as the lazy-build
/// queue for `ClassSymbolTable`s (spec.md §3 "Lifecycles": "Symbol tables
/// for generic instantiations are materialized lazily the first time a
/// type is mentioned").
#[derive(Debug, Default)]
pub struct InstantiationWorklist {
    seen: Vec<ResolvedType>,
    pending: VecDeque<ResolvedType>,
}

impl InstantiationWorklist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a mention of `resolved`. Returns `true` the first time this
    /// exact (class, actuals) pair is seen, queuing it for symbol-table
    /// construction.
    pub fn record(&mut self, resolved: ResolvedType) -> bool {
        if self.seen.contains(&resolved) {
            return false;
        }
        self.seen.push(resolved.clone());
        self.pending.push_back(resolved);
        true
    }

    pub fn next_pending(&mut self) -> Option<ResolvedType> {
        self.pending.pop_front()
    }

    pub fn all_seen(&self) -> &[ResolvedType] {
        &self.seen
    }
}
