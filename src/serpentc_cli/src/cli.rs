use crate::commands::build::BuildArgs;
use crate::commands::exec::ExecArgs;
use crate::commands::init::InitArgs;
use crate::commands::jar::JarArgs;
use crate::commands::run::RunArgs;
use crate::commands::{build, exec, init, jar, run};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "serpentc")]
#[command(about = "Serpent compiler CLI", version, author)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scaffold a minimal project directory
    Init(Box<InitArgs>),

    /// Compile source into a directory of class files
    Build(Box<BuildArgs>),

    /// Invoke the host VM on a compiled class directory
    Run(Box<RunArgs>),

    /// Build then run
    Exec(Box<ExecArgs>),

    /// Package a class directory into a runtime archive
    Jar(Box<JarArgs>),
}

pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init(args) => init::execute(*args),
        Commands::Build(args) => build::execute(*args).map(|_| ()),
        Commands::Run(args) => run::execute(*args),
        Commands::Exec(args) => exec::execute(*args),
        Commands::Jar(args) => jar::execute(*args),
    }
}
