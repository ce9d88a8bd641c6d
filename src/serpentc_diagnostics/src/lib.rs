//! Shared diagnostics for the serpentc pipeline: a phase-tagged,
//! source-located error/warning collector threaded through every stage
//! from AST examination to class-file emission.

pub mod code;
pub mod collection;
pub mod diagnostic;
pub mod location;

pub use code::{DiagnosticCode, Phase};
pub use collection::DiagnosticCollection;
pub use diagnostic::{Diagnostic, Severity};
pub use location::SourceLocation;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_tracks_errors_and_warnings_independently() {
        let mut diags = DiagnosticCollection::new();
        assert!(!diags.has_errors());

        diags.add_warning(
            Phase::Type,
            DiagnosticCode::W9001UnreachableElseifArm,
            None,
            "arm can never execute",
        );
        assert!(!diags.has_errors());
        assert_eq!(diags.warning_count(), 1);

        diags.add_error(
            Phase::Inheritance,
            DiagnosticCode::IE2004AmbiguousFeatureNoSelect,
            Some(SourceLocation::new("d.e", 3, 1)),
            "feature f is ambiguous",
        );
        assert!(diags.has_errors());
        assert_eq!(diags.error_count(), 1);
    }

    #[test]
    fn diagnostic_display_matches_phase_location_message_form() {
        let d = Diagnostic::error(
            Phase::System,
            DiagnosticCode::SE1002MissingRootClass,
            None,
            "no class provides GENERAL",
        );
        let text = d.to_string();
        assert!(text.starts_with("system: <unknown>: no class provides GENERAL"));
    }
}
