//! `build` (spec.md §6): drives the whole pipeline — external parser,
//! system examination, inheritance flattening, type checking/IR lowering,
//! bytecode emission — and writes one class file per compiled class.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{bail, Context, Result};
use clap::Args;
use log::{debug, info};
use serpentc_ast::{program_from_json, Identifier, Program};

use crate::config::ProjectConfig;
use crate::errors::check_diagnostics;

const DEFAULT_PARSER: &str = "eiffelp";
const DEFAULT_MAIN_CLASS: &str = "APPLICATION";
const DEFAULT_MAIN_ROUTINE: &str = "make";
const DEFAULT_RELEASE: u16 = 8;
const DEFAULT_OUT_DIR: &str = "classes";

#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    /// Source folder (default: current directory)
    #[arg(default_value = ".")]
    pub source: PathBuf,

    /// Main class (default: APPLICATION, or serpent.toml)
    #[arg(short = 'm', long = "mainclass")]
    pub main_class: Option<String>,

    /// Main routine (default: make, or serpent.toml)
    #[arg(short = 'r', long = "mainroutine")]
    pub main_routine: Option<String>,

    /// JVM release to target (default: 8, or serpent.toml)
    #[arg(short = 'j', long = "javaversion")]
    pub release: Option<u16>,

    /// Build output folder (default: classes, or serpent.toml)
    #[arg(short = 'd', long = "outputdir")]
    pub out_dir: Option<String>,

    /// Show a class-by-class progress indicator on standard error
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

/// What a successful build produced, so `exec` can hand it straight to
/// `run` without re-deriving the main class / output directory.
pub struct BuildOutcome {
    pub out_dir: PathBuf,
    pub main_class: String,
}

pub fn execute(args: BuildArgs) -> Result<BuildOutcome> {
    let config = ProjectConfig::load_from(&std::env::current_dir()?)?;

    let main_class = args
        .main_class
        .or(config.main_class.clone())
        .unwrap_or_else(|| DEFAULT_MAIN_CLASS.to_string());
    let main_routine = args
        .main_routine
        .or(config.main_routine.clone())
        .unwrap_or_else(|| DEFAULT_MAIN_ROUTINE.to_string());
    let release = args.release.or(config.release).unwrap_or(DEFAULT_RELEASE);
    let out_dir = PathBuf::from(
        args.out_dir
            .or(config.out_dir.clone())
            .unwrap_or_else(|| DEFAULT_OUT_DIR.to_string()),
    );
    let parser = config.parser.clone().unwrap_or_else(|| DEFAULT_PARSER.to_string());

    let mut program = parse_program(&args.source, &parser)?;
    program.main_class = Some(Identifier::new(main_class.as_str()));
    program.main_routine = Some(Identifier::new(main_routine.as_str()));

    debug!("examining system");
    let examine_diags = serpentc_examine::examine(&program);
    check_diagnostics("system examination", &examine_diags)?;

    debug!("flattening inheritance");
    let (flattened, flatten_diags) = serpentc_flatten::flatten_program(&program);
    check_diagnostics("inheritance flattening", &flatten_diags)?;

    debug!("type-checking and lowering");
    let (typed_program, check_diags) = serpentc_check::check_program(&program, &flattened);
    check_diagnostics("type checking", &check_diags)?;

    debug!("emitting bytecode");
    let (outputs, emit_diags) = serpentc_codegen::emit_program(&typed_program, release)
        .context("internal codegen invariant violated")?;
    check_diagnostics("bytecode emission", &emit_diags)?;

    fs::create_dir_all(&out_dir).with_context(|| format!("failed to create {}", out_dir.display()))?;
    for (name, bytes) in &outputs {
        let internal = serpentc_codegen::bridge::internal_class_name(name);
        let class_path = out_dir.join(format!("{internal}.class"));
        if let Some(parent) = class_path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("failed to create {}", parent.display()))?;
        }
        if args.verbose {
            eprintln!("compiling {name}");
        }
        fs::write(&class_path, bytes).with_context(|| format!("failed to write {}", class_path.display()))?;
    }

    if let Some(runtime_dir) = config.runtime_dir.as_ref().map(PathBuf::from) {
        copy_runtime_classes(&runtime_dir, &out_dir)?;
    }

    info!("wrote {} class file(s) to {}", outputs.len(), out_dir.display());
    Ok(BuildOutcome { out_dir, main_class })
}

/// Invokes the external parser as a child process (spec.md §6): its
/// standard output is the JSON AST, its standard error carries parse
/// diagnostics. A non-zero exit, or any stderr output, aborts the
/// pipeline before the AST is built — mirroring
/// `original_source/serpent/parser_adapter.py`'s contract.
fn parse_program(source: &Path, parser: &str) -> Result<Program> {
    let files = collect_source_files(source)?;
    if files.is_empty() {
        bail!("no `.e` source files found under {}", source.display());
    }

    let output = Command::new(parser)
        .args(&files)
        .output()
        .with_context(|| format!("couldn't find eiffel parser by path \"{parser}\""))?;

    let stderr = String::from_utf8_lossy(&output.stderr);
    if !output.status.success() || !stderr.trim().is_empty() {
        bail!("parse error: {}", stderr.trim());
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    program_from_json(&stdout).context("malformed AST from external parser")
}

fn collect_source_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    collect_into(root, &mut files)?;
    files.sort();
    Ok(files)
}

fn collect_into(path: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    if path.is_file() {
        if path.extension().and_then(|e| e.to_str()) == Some("e") {
            out.push(path.to_path_buf());
        }
        return Ok(());
    }
    let entries = fs::read_dir(path).with_context(|| format!("failed to read {}", path.display()))?;
    for entry in entries {
        let entry = entry?;
        let child = entry.path();
        if child.is_dir() {
            collect_into(&child, out)?;
        } else if child.extension().and_then(|e| e.to_str()) == Some("e") {
            out.push(child);
        }
    }
    Ok(())
}

fn copy_runtime_classes(runtime_dir: &Path, out_dir: &Path) -> Result<()> {
    if !runtime_dir.exists() {
        debug!("no runtime directory at {}, skipping", runtime_dir.display());
        return Ok(());
    }
    for entry in fs::read_dir(runtime_dir).with_context(|| format!("failed to read {}", runtime_dir.display()))? {
        let entry = entry?;
        let src = entry.path();
        let dest = out_dir.join(entry.file_name());
        if src.is_dir() {
            copy_runtime_classes(&src, &dest)?;
        } else {
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(&src, &dest).with_context(|| format!("failed to copy {} to {}", src.display(), dest.display()))?;
        }
    }
    Ok(())
}
