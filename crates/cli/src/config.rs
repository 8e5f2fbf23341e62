//! Configuration management for the CLI

use anyhow::{Context, Result};
use predict_lib::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::output::OutputFormat;

/// CLI configuration file contents
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Inference service base URL
    pub api_url: Option<String>,
    /// Per-request deadline in milliseconds
    pub timeout_ms: Option<u64>,
    /// Default output format ("table" or "json")
    pub default_format: Option<String>,
}

/// Values the commands run with after flags, env and file are merged
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_url: String,
    pub timeout: Duration,
    pub format: OutputFormat,
}

impl Config {
    /// Load configuration from `path`, or from the default location
    ///
    /// A missing file yields the empty configuration.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::config_path()?,
        };

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file {}", config_path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", config_path.display()))
    }

    /// Merge with command-line values; flags and env win over the file
    pub fn resolve(
        &self,
        api_url: Option<String>,
        timeout_ms: Option<u64>,
        format: Option<OutputFormat>,
    ) -> Result<Settings> {
        let format = match (format, &self.default_format) {
            (Some(format), _) => format,
            (None, Some(name)) => name
                .parse::<OutputFormat>()
                .map_err(anyhow::Error::msg)
                .context("Invalid default_format in config file")?,
            (None, None) => OutputFormat::default(),
        };

        let timeout = timeout_ms
            .or(self.timeout_ms)
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_TIMEOUT);

        Ok(Settings {
            api_url: api_url
                .or_else(|| self.api_url.clone())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout,
            format,
        })
    }

    /// Get the configuration file path
    fn config_path() -> Result<PathBuf> {
        let home = dirs_next::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".config").join("fnac").join("config.json"))
    }
}
