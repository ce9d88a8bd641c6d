//! `run` (spec.md §6): invokes the host VM with verification disabled,
//! grounded in `original_source/serpent/build.py`'s `run()` — the
//! reference toolchain runs with `-noverify` because this codegen never
//! emits `StackMapTable` frames (SPEC_FULL.md §C.5, spec.md §9 Open
//! Question (a)).

use std::path::PathBuf;
use std::process::Command;

use anyhow::{bail, Context, Result};
use clap::Args;
use serpentc_codegen::bridge::internal_class_name;

use crate::config::ProjectConfig;

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Folder with class files (default: classes, or serpent.toml)
    #[arg(short = 'c', long = "classpath")]
    pub classpath: Option<String>,

    /// Main class (default: APPLICATION, or serpent.toml)
    #[arg(short = 'm', long = "mainclass")]
    pub main_class: Option<String>,

    /// Arguments forwarded to the running program
    #[arg(last = true)]
    pub args: Vec<String>,
}

pub fn execute(args: RunArgs) -> Result<()> {
    let config = ProjectConfig::load_from(&std::env::current_dir()?)?;
    let classpath = args.classpath.or(config.out_dir.clone()).unwrap_or_else(|| "classes".to_string());
    let main_class = args.main_class.or(config.main_class.clone()).unwrap_or_else(|| "APPLICATION".to_string());
    run_class(&PathBuf::from(classpath), &main_class, &args.args)
}

pub fn run_class(classpath: &PathBuf, main_class: &str, program_args: &[String]) -> Result<()> {
    let fq_main_class = internal_class_name(main_class);
    let status = Command::new("java")
        .arg("-noverify")
        .arg("-classpath")
        .arg(classpath)
        .arg(&fq_main_class)
        .args(program_args)
        .status()
        .context("failed to launch the host VM (is `java` on PATH?)")?;

    if !status.success() {
        bail!("runtime error: {fq_main_class} exited with {status}");
    }
    Ok(())
}
