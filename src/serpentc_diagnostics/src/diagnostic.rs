use serde::{Deserialize, Serialize};
use std::fmt;

use crate::code::{DiagnosticCode, Phase};
use crate::location::SourceLocation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub phase: Phase,
    pub code: DiagnosticCode,
    pub severity: Severity,
    pub location: Option<SourceLocation>,
    pub message: String,
}

impl Diagnostic {
    pub fn error(
        phase: Phase,
        code: DiagnosticCode,
        location: Option<SourceLocation>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            phase,
            code,
            severity: Severity::Error,
            location,
            message: message.into(),
        }
    }

    pub fn warning(
        phase: Phase,
        code: DiagnosticCode,
        location: Option<SourceLocation>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            phase,
            code,
            severity: Severity::Warning,
            location,
            message: message.into(),
        }
    }
}

/// `<phase>: <source-location>: <message>`, per spec.md §7's user-visible
/// behavior.
impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let loc = self
            .location
            .as_ref()
            .map(|l| l.to_string())
            .unwrap_or_else(|| "<unknown>".to_string());
        write!(f, "{}: {}: {}", self.phase, loc, self.message)
    }
}
