//! bnd-win32: Win32 JSON metadata → Rust FFI bindings.
//!
//! Reads a win32json corpus (one `<Namespace>.json` file per API
//! namespace), resolves every cross-type reference, computes native struct
//! and union layouts, builds a binding model per namespace, and renders one
//! Rust module per namespace. Generated modules call into the `bnd-rt`
//! runtime crate.
//!
//! # Quick start
//!
//! Generate bindings from a config (suitable for `build.rs`):
//!
//! ```no_run
//! use std::path::Path;
//!
//! // Reads config TOML, loads the corpus, writes one .rs per namespace + mod.rs.
//! bnd_win32::run(Path::new("bnd-win32.toml"), None).unwrap();
//! ```
//!
//! Or get the rendered modules without writing to disk:
//!
//! ```no_run
//! use std::path::Path;
//!
//! let modules = bnd_win32::generate(Path::new("bnd-win32.toml")).unwrap();
//! for m in &modules {
//!     println!("{}: {} bytes", m.module, m.source.len());
//! }
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rayon::prelude::*;
use tracing::{info, warn};

pub mod builder;
pub mod config;
pub mod emit;
pub mod error;
pub mod exceptions;
pub mod layout;
pub mod metadata;
pub mod model;
pub mod registry;
pub mod types;

pub use error::GenError;

use builder::{BindingModelBuilder, BuildOptions};
use config::Arch;
use emit::{CodeEmitter, EmitOptions};
use registry::TypeRegistry;

/// Settings the core needs besides the corpus itself.
#[derive(Debug, Clone)]
pub struct Options {
    pub arch: Arch,
    /// Namespaces to emit; empty emits all.
    pub namespaces: Vec<String>,
    /// Runtime crate path used by generated code.
    pub runtime: String,
    pub check_duplicate_names: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            arch: Arch::X64,
            namespaces: Vec::new(),
            runtime: EmitOptions::default().runtime,
            check_duplicate_names: true,
        }
    }
}

/// One rendered namespace module.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub namespace: String,
    /// File stem / module name (`UI_Shell`).
    pub module: String,
    pub source: Vec<u8>,
}

/// Run the full pipeline: load config, load the corpus, generate, and write
/// every module plus a `mod.rs` index.
///
/// `config_path` is the path to a `bnd-win32.toml` configuration file.
/// `output` optionally overrides the output directory from the config.
///
/// Nothing is written unless every namespace rendered successfully.
///
/// Returns the directory the modules were written to.
pub fn run(config_path: &Path, output: Option<&Path>) -> Result<PathBuf> {
    let cfg = config::load_config(config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?;

    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    run_config(&cfg, base_dir, output)
}

/// [`run`] for an already-loaded (and possibly amended) config.
pub fn run_config(cfg: &config::Config, base_dir: &Path, output: Option<&Path>) -> Result<PathBuf> {
    let modules = generate_from_config(cfg, base_dir)?;

    let output_dir = match output {
        Some(p) => p.to_path_buf(),
        None => config::resolve_path(&cfg.output.dir, base_dir),
    };
    write_modules(&output_dir, &modules)?;

    Ok(output_dir)
}

/// Parse a `bnd-win32.toml` config file and return the rendered modules
/// without writing to disk.
pub fn generate(config_path: &Path) -> Result<Vec<Rendered>> {
    let cfg = config::load_config(config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?;

    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));

    generate_from_config(&cfg, base_dir)
}

/// Generate modules from an already-loaded [`config::Config`].
///
/// `base_dir` is the directory relative to which paths in the config are
/// resolved (typically the parent directory of the TOML file).
pub fn generate_from_config(cfg: &config::Config, base_dir: &Path) -> Result<Vec<Rendered>> {
    info!(
        arch = cfg.target.arch.metadata_name(),
        libraries = cfg.target.libraries.len(),
        namespaces = cfg.input.namespaces.len(),
        "loaded configuration"
    );

    let input_dir = config::resolve_path(&cfg.input.dir, base_dir);
    let mut apis = metadata::load_dir(&input_dir)?;
    for api in &mut apis {
        metadata::retain_in_scope(api, cfg.target.arch.metadata_name(), &cfg.target.libraries);
    }

    let options = Options {
        arch: cfg.target.arch,
        namespaces: cfg.input.namespaces.clone(),
        runtime: cfg.output.runtime.clone(),
        check_duplicate_names: cfg.output.check_duplicate_names,
    };
    let modules = generate_from_apis(apis, &options).context("generating bindings")?;
    Ok(modules)
}

/// The core: registry → per-namespace model → rendered module.
///
/// Namespaces are built and rendered in parallel; each worker owns its
/// layout and resolver caches and shares only the immutable registry.
/// Output order follows the input order of `apis`.
pub fn generate_from_apis(
    apis: Vec<metadata::Api>,
    options: &Options,
) -> Result<Vec<Rendered>, GenError> {
    let (registry, namespaces) = TypeRegistry::build(apis)?;

    let selected: Vec<&registry::Namespace> = namespaces
        .iter()
        .filter(|ns| options.namespaces.is_empty() || options.namespaces.contains(&ns.name))
        .collect();
    for wanted in &options.namespaces {
        if !namespaces.iter().any(|ns| &ns.name == wanted) {
            warn!(namespace = %wanted, "configured namespace not found in corpus");
        }
    }

    let build = BuildOptions {
        pointer_width: options.arch.pointer_width(),
        check_duplicate_names: options.check_duplicate_names,
    };
    let emitter = CodeEmitter::new(EmitOptions {
        runtime: options.runtime.clone(),
    });

    let results = selected
        .par_iter()
        .map(|ns| {
            let model = BindingModelBuilder::new(&registry, build).build(ns)?;
            let rendered = Rendered {
                namespace: model.namespace.clone(),
                module: model.module_name(),
                source: emitter.render(&model),
            };
            Ok((rendered, model.dependencies()))
        })
        .collect::<Result<Vec<_>, GenError>>()?;

    let emitted: HashSet<&str> = results.iter().map(|(r, _)| r.namespace.as_str()).collect();
    for (rendered, deps) in &results {
        for dep in deps.iter().filter(|d| !emitted.contains(d.as_str())) {
            warn!(
                namespace = %rendered.namespace,
                dependency = %dep,
                "module refers to a namespace that is not emitted"
            );
        }
    }

    let modules: Vec<Rendered> = results.into_iter().map(|(r, _)| r).collect();
    info!(
        modules = modules.len(),
        bytes = modules.iter().map(|m| m.source.len()).sum::<usize>(),
        "generated bindings"
    );
    Ok(modules)
}

/// Write each module as `<module>.rs` plus a `mod.rs` index into `dir`.
pub fn write_modules(dir: &Path, modules: &[Rendered]) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating output directory {}", dir.display()))?;

    for m in modules {
        let path = dir.join(format!("{}.rs", m.module));
        std::fs::write(&path, &m.source)
            .with_context(|| format!("writing output to {}", path.display()))?;
    }

    let names: Vec<String> = modules.iter().map(|m| m.module.clone()).collect();
    let index = CodeEmitter::default().render_index(&names);
    let index_path = dir.join("mod.rs");
    std::fs::write(&index_path, &index)
        .with_context(|| format!("writing output to {}", index_path.display()))?;

    info!(
        path = %dir.display(),
        modules = modules.len(),
        "wrote bindings"
    );
    Ok(())
}
