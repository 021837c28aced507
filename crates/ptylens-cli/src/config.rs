//! CLI configuration.

use crate::error::{CliError, Result};
use anyhow::Context;
use ptylens_core::{DEFAULT_HISTORY_BYTES, DEFAULT_MAX_LINES};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// How command output is printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(CliError::InvalidFormat(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Row bound for screen buffers
    #[serde(default = "default_max_lines")]
    pub max_lines: usize,
    /// Byte budget of the chunk history in per-chunk mode
    #[serde(default = "default_history_max_bytes")]
    pub history_max_bytes: usize,
    /// Apply the significance filter even without `--significant`
    #[serde(default)]
    pub significant_only: bool,
    #[serde(default)]
    pub format: OutputFormat,
}

fn default_max_lines() -> usize {
    DEFAULT_MAX_LINES
}

fn default_history_max_bytes() -> usize {
    DEFAULT_HISTORY_BYTES
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_lines: default_max_lines(),
            history_max_bytes: default_history_max_bytes(),
            significant_only: false,
            format: OutputFormat::default(),
        }
    }
}

impl Config {
    /// Load config from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| CliError::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| CliError::InvalidConfig {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load config from `explicit` if given, otherwise from the first default
    /// location that exists, otherwise fall back to defaults.
    ///
    /// Returns the config and the file it came from.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            let config = Self::load_from(path)
                .with_context(|| format!("Loading config from --config {}", path.display()))?;
            return Ok((config, Some(path.to_path_buf())));
        }

        for path in default_paths() {
            if path.exists() {
                let config = Self::load_from(&path)?;
                return Ok((config, Some(path)));
            }
        }

        Ok((Config::default(), None))
    }
}

/// `./config/ptylens.toml`, then `<config dir>/ptylens/config.toml`.
pub fn default_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("config/ptylens.toml")];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("ptylens").join("config.toml"));
    }
    paths
}
