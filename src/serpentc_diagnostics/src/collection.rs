use serde::{Deserialize, Serialize};

use crate::code::{DiagnosticCode, Phase};
use crate::diagnostic::{Diagnostic, Severity};
use crate::location::SourceLocation;

/// Shared error collector threaded through every phase of the pipeline.
/// Errors within a single class/phase accumulate rather than aborting on
/// the first one (spec.md §5/§7): `has_errors` is checked at each phase
/// boundary and the next phase only runs if it is still false.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiagnosticCollection {
    pub diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn add_error(
        &mut self,
        phase: Phase,
        code: DiagnosticCode,
        location: Option<SourceLocation>,
        message: impl Into<String>,
    ) {
        self.add(Diagnostic::error(phase, code, location, message));
    }

    pub fn add_warning(
        &mut self,
        phase: Phase,
        code: DiagnosticCode,
        location: Option<SourceLocation>,
        message: impl Into<String>,
    ) {
        self.add(Diagnostic::warning(phase, code, location, message));
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d.severity, Severity::Error))
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d.severity, Severity::Warning))
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    pub fn extend(&mut self, other: DiagnosticCollection) {
        self.diagnostics.extend(other.diagnostics);
    }

    /// Print every collected diagnostic to stderr, one per line, in the
    /// `<phase>: <source-location>: <message>` form spec.md §7 mandates.
    pub fn emit_to_stderr(&self) {
        for diagnostic in &self.diagnostics {
            eprintln!("{diagnostic}");
        }
    }
}
