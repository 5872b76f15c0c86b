//! Configuration file handling.
//!
//! Loads and saves paramprobe configuration from a TOML file at
//! `dirs::config_dir()/paramprobe/config.toml`.
//!
//! # Example Configuration
//!
//! ```toml
//! request_timeout_secs = 15
//! user_agent = "paramprobe/0.1"
//! default_format = "table"
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Per-request timeout for page fetches and probe requests, in
    /// seconds. An unresponsive target gives up instead of stalling a
    /// probe chunk forever.
    ///
    /// Default: 15
    pub request_timeout_secs: u64,

    /// User-Agent header sent on every request.
    pub user_agent: String,

    /// Default output format when no `--format` flag is provided.
    ///
    /// Valid values: "table", "json"
    pub default_format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            request_timeout_secs: 15,
            user_agent: format!("paramprobe/{}", env!("CARGO_PKG_VERSION")),
            default_format: "table".to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from the config file, or returns defaults
    /// when the file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Saves the configuration, creating the parent directory if needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("paramprobe")
            .join("config.toml")
    }

    pub fn generate_default_config() -> String {
        toml::to_string_pretty(&Config::default()).unwrap_or_default()
    }
}
