//! Configuration management for subgraph-probe.
//!
//! Handles loading configuration from TOML files, with settings for the
//! credential proxy and the local state database location.

use crate::error::{ProbeError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for subgraph-probe.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Credential proxy configuration.
    #[serde(default)]
    pub proxy: ProxyConfig,

    /// Local storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Credential proxy configuration.
///
/// Covers both sides of the proxy boundary: where `sgprobe serve` listens,
/// and where `sgprobe run` sends execution requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Address the proxy binds to when serving.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Port the proxy binds to when serving.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Full endpoint URL used by `run` to reach the proxy.
    ///
    /// Defaults to the listen address and port above, so a proxy started
    /// with `sgprobe serve` on the same machine is found without any
    /// configuration.
    pub url: Option<String>,
}

fn default_listen_addr() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8474
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            port: default_port(),
            url: None,
        }
    }
}

impl ProxyConfig {
    /// Returns the endpoint URL the client side should post executions to.
    pub fn endpoint_url(&self) -> String {
        match &self.url {
            Some(url) => url.clone(),
            None => format!("http://{}:{}/api/graphql", self.listen_addr, self.port),
        }
    }
}

/// Local storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Override for the state database path.
    pub state_db: Option<PathBuf>,
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("subgraph-probe")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file.
    ///
    /// A missing file is not an error; defaults apply.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ProbeError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            ProbeError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }
}
