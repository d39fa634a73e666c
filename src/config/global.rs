//! Global configuration file (`~/.rpz-params/config.toml`).
//!
//! The file is optional; every key has a built-in default.
//!
//! # Configuration File Location
//!
//! - **Unix/macOS**: `~/.rpz-params/config.toml`
//! - **Windows**: `%LOCALAPPDATA%\rpz-params\config.toml`
//!
//! The location can be overridden with the `RPZ_PARAMS_CONFIG` environment
//! variable or the `--config` command-line option.
//!
//! # File Format
//!
//! ```toml
//! # Base URL of the parameter server (the tool version is appended)
//! parameters_url = "https://mirror.example.org/parameters/"
//!
//! # Where parameters.json is cached
//! cache_dir = "~/.cache/rpz-params"
//!
//! # Certificate authority the parameter server must chain to
//! ca_certificate = "~/.rpz-params/ca.crt"
//!
//! # Download timeout in seconds
//! fetch_timeout = 10
//! ```
//!
//! Paths may use `~` and `$VAR`, expanded when the file is loaded.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::constants::CONFIG_PATH_ENV_VAR;
use crate::core::ParamsError;

/// Settings read from the global configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GlobalConfig {
    /// Base URL of the parameter server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters_url: Option<String>,

    /// Cache directory for the downloaded parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,

    /// PEM file with the certificate authority to pin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_certificate: Option<PathBuf>,

    /// Download timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetch_timeout: Option<u64>,
}

impl GlobalConfig {
    /// Load from `path`, or from the default location when `path` is `None`.
    ///
    /// A missing file yields the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read, is not valid
    /// TOML, or has an unusable value.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => Self::default_path()?,
        };

        if path.exists() {
            Self::load_from(&path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read global config from {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse global config from {}", path.display()))?;

        config
            .expanded()
            .with_context(|| format!("Invalid global config in {}", path.display()))
    }

    /// Default location, honoring `RPZ_PARAMS_CONFIG`.
    ///
    /// # Errors
    ///
    /// Returns an error if the home (or, on Windows, local data) directory
    /// cannot be determined.
    pub fn default_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV_VAR) {
            return Ok(PathBuf::from(path));
        }

        Ok(config_dir()?.join("config.toml"))
    }

    fn expanded(mut self) -> Result<Self, ParamsError> {
        if self.fetch_timeout == Some(0) {
            return Err(ParamsError::ConfigError {
                message: "fetch_timeout must be at least 1 second".to_string(),
            });
        }
        if let Some(url) = &self.parameters_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ParamsError::ConfigError {
                    message: format!("parameters_url must be an http(s) URL, got '{url}'"),
                });
            }
        }

        self.cache_dir = self.cache_dir.map(|p| expand_path(&p)).transpose()?;
        self.ca_certificate = self.ca_certificate.map(|p| expand_path(&p)).transpose()?;
        Ok(self)
    }
}

/// Base directory for the configuration file and the default cache.
pub(crate) fn config_dir() -> Result<PathBuf> {
    let dir = if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .ok_or_else(|| anyhow::anyhow!("Unable to determine local data directory"))?
            .join("rpz-params")
    } else {
        dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?
            .join(".rpz-params")
    };
    Ok(dir)
}

/// Expand `~` and environment variables in a configured path.
pub(crate) fn expand_path(path: &Path) -> Result<PathBuf, ParamsError> {
    let raw = path.to_string_lossy();
    shellexpand::full(&raw)
        .map(|expanded| PathBuf::from(expanded.as_ref()))
        .map_err(|e| ParamsError::ConfigError {
            message: format!("cannot expand path '{raw}': {e}"),
        })
}
