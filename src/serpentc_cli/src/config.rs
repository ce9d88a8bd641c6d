//! `serpent.toml` project manifest (SPEC_FULL.md §B "Configuration"):
//! records defaults `build`/`run`/`exec` would otherwise need repeated on
//! every invocation, read with the `toml` crate the way
//! `bsharp_analysis::workspace::csproj` reads a project file.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub main_class: Option<String>,
    #[serde(default)]
    pub main_routine: Option<String>,
    #[serde(default)]
    pub release: Option<u16>,
    #[serde(default)]
    pub out_dir: Option<String>,
    /// Path (or bare name resolved on `PATH`) to the external parser
    /// binary (spec.md §6 "the parser is invoked as a child process"),
    /// defaulting to `eiffelp`, the name `original_source`'s `cmd.py`
    /// resolves from its bundled resources.
    #[serde(default)]
    pub parser: Option<String>,
    /// Directory of precompiled host-runtime class files to copy
    /// alongside the compiled output (spec.md §6 "Output layout").
    #[serde(default)]
    pub runtime_dir: Option<String>,
}

pub const MANIFEST_NAME: &str = "serpent.toml";

impl ProjectConfig {
    /// Reads `serpent.toml` from `dir` if present; an absent manifest is
    /// not an error, just an empty set of defaults.
    pub fn load_from(dir: &Path) -> Result<Self> {
        let path = dir.join(MANIFEST_NAME);
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
    }
}
