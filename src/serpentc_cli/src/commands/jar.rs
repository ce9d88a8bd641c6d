//! `jar` (spec.md §6): packages a class directory into a runtime archive
//! with a manifest naming the entry class. `original_source`'s
//! `make_jar` shells out to the `jar` tool; we build the archive directly
//! with the `zip` crate instead, the way the ambient stack generally
//! prefers an in-process crate over spawning another toolchain binary.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serpentc_codegen::bridge::internal_class_name;
use zip::write::{SimpleFileOptions, ZipWriter};
use zip::CompressionMethod;

#[derive(Args, Debug, Clone)]
pub struct JarArgs {
    /// Folder with class files (default: classes)
    #[arg(default_value = "classes")]
    pub classpath: PathBuf,

    /// Main class named by the manifest's `Main-Class` entry (default: APPLICATION)
    #[arg(short = 'm', long = "mainclass", default_value = "APPLICATION")]
    pub main_class: String,

    /// Output folder for the jar file (default: current directory)
    #[arg(short = 'd', long = "outputdir", default_value = ".")]
    pub out_dir: PathBuf,

    /// Jar file name (default: app.jar)
    #[arg(short = 'n', long = "jarname", default_value = "app.jar")]
    pub name: String,
}

pub fn execute(args: JarArgs) -> Result<()> {
    fs::create_dir_all(&args.out_dir).with_context(|| format!("failed to create {}", args.out_dir.display()))?;
    let jar_path = args.out_dir.join(&args.name);
    let file = File::create(&jar_path).with_context(|| format!("failed to create {}", jar_path.display()))?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let fq_main_class = internal_class_name(&args.main_class);
    let manifest = format!("Manifest-Version: 1.0\nMain-Class: {fq_main_class}\n\n");
    zip.start_file("META-INF/MANIFEST.MF", options)?;
    zip.write_all(manifest.as_bytes())?;

    add_directory(&mut zip, &args.classpath, &args.classpath, options)?;
    zip.finish()?;
    Ok(())
}

fn add_directory(zip: &mut ZipWriter<File>, root: &Path, dir: &Path, options: SimpleFileOptions) -> Result<()> {
    for entry in fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            add_directory(zip, root, &path, options)?;
            continue;
        }
        let relative = path
            .strip_prefix(root)
            .unwrap_or(&path)
            .to_string_lossy()
            .replace('\\', "/");
        let bytes = fs::read(&path).with_context(|| format!("failed to read {}", path.display()))?;
        zip.start_file(relative, options)?;
        zip.write_all(&bytes)?;
    }
    Ok(())
}
