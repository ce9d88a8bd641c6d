use serde::{Deserialize, Serialize};
use std::fmt;

/// A location in a source file, as recorded on AST nodes by the external
/// parser. `line`/`column` are 1-based; absent when a node was synthesized
/// by the compiler itself (e.g. the root class) rather than parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }

    pub fn synthetic() -> Self {
        Self {
            file: "<synthesized>".to_string(),
            line: 0,
            column: 0,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}
