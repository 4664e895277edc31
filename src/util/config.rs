//! Configuration file support for Five.
//!
//! Five reads two configuration files:
//! - Global: `<user config dir>/five/config.toml` - User-wide defaults
//! - Project: `.five/config.toml` - Overrides for the current directory
//!
//! Project config takes precedence over global config. Command-line flags
//! take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Five configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// `five compile` settings
    pub compile: CompileConfig,

    /// `five run` settings
    pub run: RunConfig,
}

/// Compile-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CompileConfig {
    /// Directory the `.app` bundle is written to (None = current directory)
    pub out_dir: Option<PathBuf>,
}

/// Run-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RunConfig {
    /// Parent of the per-run scratch workspace (None = system temp dir)
    pub scratch_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if the file is missing or broken.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("ignoring config {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.compile.out_dir.is_some() {
            self.compile.out_dir = other.compile.out_dir;
        }
        if other.run.scratch_dir.is_some() {
            self.run.scratch_dir = other.run.scratch_dir;
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.five/config.toml)
/// 2. Global config (<user config dir>/five/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        config.merge(Config::load_or_default(global_path));
    }
    config.merge(Config::load_or_default(project_path));

    config
}

/// Get the project config path (.five/config.toml) for `dir`.
pub fn project_config_path(dir: &Path) -> PathBuf {
    dir.join(".five").join("config.toml")
}
