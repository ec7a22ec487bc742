//! Command-line front end: loads `bnd-win32.toml`, applies any overrides
//! given on the command line, and writes the namespace modules.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use bnd_win32::config::{self, Arch};

/// Generate Rust FFI bindings for Win32 APIs from win32json metadata.
///
/// Writes one module per namespace plus a `mod.rs` index. Generated code
/// calls into the `bnd-rt` runtime crate.
#[derive(Parser, Debug)]
#[command(name = "bnd-win32", version, about, long_about)]
struct Cli {
    /// Path to the bnd-win32.toml configuration file.
    #[arg(default_value = "bnd-win32.toml")]
    config: PathBuf,

    /// Output directory (overrides `[output] dir`).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Target architecture: selects arch-specific declarations and the
    /// pointer width used for layouts (overrides `[target] arch`).
    #[arg(long, value_enum)]
    arch: Option<Arch>,

    /// Emit only this namespace, e.g. `UI.WindowsAndMessaging`. Repeatable;
    /// replaces `[input] namespaces`.
    #[arg(short, long = "namespace", value_name = "NAMESPACE")]
    namespaces: Vec<String>,

    /// Bind functions from this import library only, without `.dll`.
    /// Repeatable; replaces `[target] libraries`.
    #[arg(short, long = "library", value_name = "LIBRARY")]
    libraries: Vec<String>,

    /// Keep going when a namespace emits the same name twice.
    #[arg(long)]
    allow_duplicate_names: bool,

    /// Render every module and report sizes without writing anything.
    #[arg(long)]
    dry_run: bool,
}

impl Cli {
    fn apply(&self, cfg: &mut config::Config) {
        if let Some(arch) = self.arch {
            cfg.target.arch = arch;
        }
        if !self.namespaces.is_empty() {
            cfg.input.namespaces = self.namespaces.clone();
        }
        if !self.libraries.is_empty() {
            cfg.target.libraries = self.libraries.clone();
        }
        if self.allow_duplicate_names {
            cfg.output.check_duplicate_names = false;
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("bnd_win32=info")),
        )
        .init();

    let cli = Cli::parse();
    let mut cfg = config::load_config(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    cli.apply(&mut cfg);
    let base_dir = cli.config.parent().unwrap_or_else(|| Path::new("."));

    if cli.dry_run {
        for m in bnd_win32::generate_from_config(&cfg, base_dir)? {
            println!("{}.rs\t{}\t{} bytes", m.module, m.namespace, m.source.len());
        }
        return Ok(());
    }

    let dir = bnd_win32::run_config(&cfg, base_dir, cli.output.as_deref())?;
    println!("wrote bindings to {}", dir.display());
    Ok(())
}
