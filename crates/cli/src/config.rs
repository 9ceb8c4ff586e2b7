//! Configuration management for the CLI
//!
//! Defaults are read from `~/.config/kubectl-rltop/config.toml` and from
//! `RLTOP_*` environment variables, in that order. Command-line flags
//! override both.

use anyhow::{Context, Result};
use rltop_lib::SortBy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::output::OutputFormat;

/// CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Namespace used by `pod` when neither `-n` nor `-A` is given
    pub default_namespace: Option<String>,
    /// Default output format
    pub format: Option<OutputFormat>,
    /// Default sort key
    pub sort_by: Option<SortBy>,
    /// Compute node percentages against capacity instead of allocatable
    pub show_capacity: bool,
    /// Omit table headers
    pub no_headers: bool,
}

impl Config {
    /// Load configuration from the default file and the environment
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path` (if it exists) and the environment
    pub fn load_from(path: &Path) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(config::Environment::with_prefix("RLTOP").try_parsing(true))
            .build()
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        settings
            .try_deserialize()
            .context("Failed to parse configuration")
    }

    /// Get the configuration file path
    fn config_path() -> Result<PathBuf> {
        let home = dirs_next::home_dir().context("Could not determine home directory")?;
        Ok(home
            .join(".config")
            .join("kubectl-rltop")
            .join("config.toml"))
    }
}
