//! `exec` (spec.md §6): `build` then `run`, mirroring
//! `original_source/serpent/cmd.py`'s `exec` subcommand, which refuses to
//! run anything if the build step collected any error.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::commands::build::{self, BuildArgs};
use crate::commands::run;

#[derive(Args, Debug, Clone)]
pub struct ExecArgs {
    /// Source folder (default: current directory)
    #[arg(short = 's', long = "source", default_value = ".")]
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

    /// Arguments forwarded to the running program
    #[arg(last = true)]
    pub args: Vec<String>,
}

pub fn execute(args: ExecArgs) -> Result<()> {
    let outcome = build::execute(BuildArgs {
        source: args.source,
        main_class: args.main_class,
        main_routine: args.main_routine,
        release: args.release,
        out_dir: args.out_dir,
        verbose: args.verbose,
    })?;

    run::run_class(&outcome.out_dir, &outcome.main_class, &args.args)
}
