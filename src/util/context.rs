//! Global context for Five operations.
//!
//! Provides centralized access to the working directory, configuration
//! locations and the verbose flag.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use directories::ProjectDirs;

use super::config::{self, Config};

/// Project directories for Five
static PROJECT_DIRS: LazyLock<Option<ProjectDirs>> =
    LazyLock::new(|| ProjectDirs::from("", "", "five"));

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Global configuration file, when the platform has a config dir
    global_config: Option<PathBuf>,

    /// Whether to use verbose output
    verbose: bool,
}

impl GlobalContext {
    /// Create a new GlobalContext rooted at the process working directory.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(Self::with_cwd(cwd))
    }

    /// Create a GlobalContext with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Self {
        GlobalContext {
            cwd,
            global_config: PROJECT_DIRS
                .as_ref()
                .map(|dirs| dirs.config_dir().join("config.toml")),
            verbose: false,
        }
    }

    /// Override the global configuration file.
    pub fn with_global_config(mut self, path: Option<PathBuf>) -> Self {
        self.global_config = path;
        self
    }

    /// Set verbose mode.
    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Get the global configuration file path.
    pub fn global_config_path(&self) -> Option<&Path> {
        self.global_config.as_deref()
    }

    /// Get the project configuration file path.
    pub fn project_config_path(&self) -> PathBuf {
        config::project_config_path(&self.cwd)
    }

    /// Load the merged configuration. Relative directories in the project
    /// file are resolved against the working directory.
    pub fn config(&self) -> Config {
        let mut config = config::load_config(self.global_config_path(), &self.project_config_path());
        config.compile.out_dir = config.compile.out_dir.map(|dir| self.cwd.join(dir));
        config.run.scratch_dir = config.run.scratch_dir.map(|dir| self.cwd.join(dir));
        config
    }

    /// Check if verbose mode is enabled.
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}
