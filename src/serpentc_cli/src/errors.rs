use anyhow::{bail, Result};
use serpentc_diagnostics::DiagnosticCollection;

/// Prints every collected diagnostic to stderr (spec.md §7 "`<phase>:
/// <source-location>: <message>`") and turns a non-empty error set into a
/// failure, the way `bsharp_cli`'s commands bail out of `anyhow::Result`
/// at the first unrecoverable condition.
pub fn check_diagnostics(stage: &str, diagnostics: &DiagnosticCollection) -> Result<()> {
    diagnostics.emit_to_stderr();
    if diagnostics.has_errors() {
        bail!(
            "{stage} reported {} error(s); no class file was written",
            diagnostics.error_count()
        );
    }
    Ok(())
}
