//! Configuration types for `bnd-win32.toml`.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Root configuration.
#[derive(Debug, Deserialize)]
pub struct Config {
    pub input: InputConfig,
    #[serde(default)]
    pub target: TargetConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Metadata corpus location.
#[derive(Debug, Deserialize)]
pub struct InputConfig {
    /// Directory of `<Namespace>.json` files, relative to the TOML file.
    pub dir: PathBuf,
    /// Namespaces to emit. Empty emits every namespace. All namespaces are
    /// still loaded, so references into unlisted ones resolve, but the
    /// emitted modules expect those siblings to exist.
    #[serde(default)]
    pub namespaces: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
pub enum Arch {
    X86,
    #[default]
    X64,
    Arm64,
}

impl Arch {
    pub fn pointer_width(self) -> usize {
        match self {
            Arch::X86 => 4,
            Arch::X64 | Arch::Arm64 => 8,
        }
    }

    /// Spelling used by the corpus' `Architectures` lists.
    pub fn metadata_name(self) -> &'static str {
        match self {
            Arch::X86 => "X86",
            Arch::X64 => "X64",
            Arch::Arm64 => "Arm64",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TargetConfig {
    #[serde(default)]
    pub arch: Arch,
    /// Import libraries whose functions are bound, without `.dll`.
    /// Empty binds every library.
    #[serde(default = "default_libraries")]
    pub libraries: Vec<String>,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            arch: Arch::default(),
            libraries: default_libraries(),
        }
    }
}

fn default_libraries() -> Vec<String> {
    [
        "advapi32", "comctl32", "comdlg32", "gdi32", "msimg32", "gdiplus", "kernel32", "ole32",
        "oleaut32", "pdh", "shell32", "shlwapi", "user32", "uxtheme", "version", "userenv",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Output settings.
#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving one `.rs` file per namespace plus `mod.rs`.
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    /// Path of the runtime crate in generated code.
    #[serde(default = "default_runtime")]
    pub runtime: String,
    /// Fail when a namespace would emit the same name twice.
    #[serde(default = "default_true")]
    pub check_duplicate_names: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            runtime: default_runtime(),
            check_duplicate_names: true,
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("src/win32")
}

fn default_runtime() -> String {
    "::bnd_rt".to_string()
}

fn default_true() -> bool {
    true
}

/// Resolve a config-relative path. Absolute paths are returned as-is.
pub fn resolve_path(path: &Path, base_dir: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

/// Load and parse a `bnd-win32.toml` configuration file.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let config: Config = toml::from_str(&content)
        .map_err(|e| anyhow::anyhow!("failed to parse config file {}: {}", path.display(), e))?;
    Ok(config)
}
