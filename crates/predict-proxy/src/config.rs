//! Proxy configuration

use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

/// Proxy configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ProxyConfig {
    /// Inference service the proxy forwards to
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    /// Port the proxy listens on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Deadline for each forwarded request in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_backend_url() -> String {
    predict_lib::DEFAULT_BASE_URL.to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_timeout_ms() -> u64 {
    predict_lib::DEFAULT_TIMEOUT.as_millis() as u64
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            port: default_port(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl ProxyConfig {
    /// Load configuration from `PROXY_*` environment variables
    pub fn load() -> Result<Self> {
        Self::from_source(config::Environment::with_prefix("PROXY").try_parsing(true))
    }

    fn from_source<S>(source: S) -> Result<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        config::Config::builder()
            .add_source(source)
            .build()
            .context("Failed to read proxy configuration")?
            .try_deserialize()
            .context("Invalid proxy configuration")
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
