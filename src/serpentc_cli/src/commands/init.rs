//! `init` (spec.md §6): scaffolds a minimal project — `serpent.toml` plus
//! a `src/` directory holding a starter `APPLICATION` class, mirroring
//! `original_source/serpent/cmd.py`'s `init_project`.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use log::info;

#[derive(Args, Debug, Clone)]
pub struct InitArgs {
    /// Project directory to create (default: app)
    #[arg(default_value = "app")]
    pub name: String,
}

const STARTER_APPLICATION: &str = "class\n    APPLICATION\n\ncreate\n    make\n\nfeature\n\n    make\n    do\n        print (\"Hello, world!%N\")\n    end\n\nend\n";

const STARTER_MANIFEST: &str = "main_class = \"APPLICATION\"\nmain_routine = \"make\"\nrelease = 8\nout_dir = \"classes\"\n";

pub fn execute(args: InitArgs) -> Result<()> {
    let root = PathBuf::from(&args.name);
    if root.exists() {
        bail!("directory {} already exists", root.display());
    }

    let src_dir = root.join("src");
    fs::create_dir_all(&src_dir)
        .with_context(|| format!("failed to create {}", src_dir.display()))?;

    fs::write(src_dir.join("app.e"), STARTER_APPLICATION)
        .with_context(|| format!("failed to write {}", src_dir.join("app.e").display()))?;

    fs::write(root.join(crate::config::MANIFEST_NAME), STARTER_MANIFEST)
        .with_context(|| format!("failed to write {}", root.join(crate::config::MANIFEST_NAME).display()))?;

    info!("scaffolded project at {}", root.display());
    Ok(())
}
