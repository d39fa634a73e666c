//! Configuration for rpz-params
//!
//! Settings come from three layers, highest precedence first:
//!
//! 1. **Environment** - `REPROZIP_PARAMETERS` selects where parameters come
//!    from, `RPZ_PARAMS_CACHE_DIR` relocates the cache.
//! 2. **Global configuration file** - see [`global`] for the file format.
//! 3. **Built-in defaults** - the public parameter server, `~/.rpz-params/cache`
//!    and a 30 second download timeout.
//!
//! [`ParametersConfig::resolve`] merges the layers without touching the
//! process environment, which keeps it testable; [`ParametersConfig::from_env`]
//! reads the real environment and configuration file.
//!
//! # Parameter source
//!
//! | `REPROZIP_PARAMETERS`                     | Effect                              |
//! |-------------------------------------------|-------------------------------------|
//! | unset, `""`, `1`, `on`, `enabled`, `yes`, `true` | download from the configured URL |
//! | `http://...` or `https://...`             | download from that URL              |
//! | anything else                             | no network, bundled parameters only |
//!
//! The running tool's version tag is always appended to the URL.

pub mod global;

pub use global::GlobalConfig;

use anyhow::Result;
use std::ffi::OsStr;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{
    CACHE_DIR_ENV_VAR, DEFAULT_FETCH_TIMEOUT, DEFAULT_PARAMETERS_URL, ENABLED_OVERRIDE_VALUES,
    PARAMETERS_ENV_VAR,
};

/// Where parameter documents are obtained from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterSource {
    /// Download from `url` (the version tag is appended), falling back to the
    /// bundled parameters on any failure.
    Remote {
        /// Base URL of the parameter server
        url: String,
    },
    /// Never touch the network.
    Bundled,
}

impl ParameterSource {
    /// Interpret the value of the `REPROZIP_PARAMETERS` override.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rpz_params::config::ParameterSource;
    ///
    /// let default = "https://params.example.org/";
    /// assert_eq!(
    ///     ParameterSource::from_override(None, default),
    ///     ParameterSource::Remote { url: default.to_string() }
    /// );
    /// assert_eq!(
    ///     ParameterSource::from_override(Some("http://localhost:8000/"), default),
    ///     ParameterSource::Remote { url: "http://localhost:8000/".to_string() }
    /// );
    /// assert_eq!(
    ///     ParameterSource::from_override(Some("disabled"), default),
    ///     ParameterSource::Bundled
    /// );
    /// ```
    pub fn from_override(value: Option<&str>, default_url: &str) -> Self {
        match value {
            None => Self::Remote {
                url: default_url.to_string(),
            },
            Some(v) if v.starts_with("http://") || v.starts_with("https://") => Self::Remote {
                url: v.to_string(),
            },
            Some(v) if ENABLED_OVERRIDE_VALUES.contains(&v) => Self::Remote {
                url: default_url.to_string(),
            },
            Some(_) => Self::Bundled,
        }
    }

    /// Interpret the raw (possibly non-Unicode) value of the override.
    ///
    /// A value that is not valid Unicode can never be a URL or one of the
    /// enabling values, so it disables the network.
    pub fn from_os_override(value: Option<&OsStr>, default_url: &str) -> Self {
        match value.map(OsStr::to_str) {
            None => Self::from_override(None, default_url),
            Some(Some(v)) => Self::from_override(Some(v), default_url),
            Some(None) => Self::Bundled,
        }
    }

    /// The full URL to download for `version_tag`, if the network is used.
    pub fn url_for(&self, version_tag: &str) -> Option<String> {
        match self {
            Self::Remote { url } => Some(format!("{url}{version_tag}")),
            Self::Bundled => None,
        }
    }
}

impl fmt::Display for ParameterSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote { url } => write!(f, "remote ({url})"),
            Self::Bundled => write!(f, "bundled only"),
        }
    }
}

/// Fully resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParametersConfig {
    /// Where parameters come from.
    pub source: ParameterSource,
    /// Version tag appended to the remote URL.
    pub version_tag: String,
    /// Directory holding the cached `parameters.json`.
    pub cache_dir: PathBuf,
    /// Certificate authority pinned for HTTPS downloads.
    pub ca_certificate: Option<PathBuf>,
    /// Download timeout.
    pub fetch_timeout: Duration,
}

impl ParametersConfig {
    /// Merge the configuration file with environment values.
    ///
    /// `override_value` is the value of `REPROZIP_PARAMETERS` and `cache_dir_env`
    /// the value of `RPZ_PARAMS_CACHE_DIR`, both `None` when unset.
    ///
    /// # Errors
    ///
    /// Returns an error if no cache directory is configured and the home
    /// directory cannot be determined.
    pub fn resolve(
        global: &GlobalConfig,
        override_value: Option<&OsStr>,
        cache_dir_env: Option<&OsStr>,
    ) -> Result<Self> {
        let default_url = global.parameters_url.as_deref().unwrap_or(DEFAULT_PARAMETERS_URL);

        let cache_dir = match (cache_dir_env, &global.cache_dir) {
            (Some(dir), _) if !dir.is_empty() => PathBuf::from(dir),
            (_, Some(dir)) => dir.clone(),
            _ => global::config_dir()?.join("cache"),
        };

        Ok(Self {
            source: ParameterSource::from_os_override(override_value, default_url),
            version_tag: env!("CARGO_PKG_VERSION").to_string(),
            cache_dir,
            ca_certificate: global.ca_certificate.clone(),
            fetch_timeout: global
                .fetch_timeout
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_FETCH_TIMEOUT),
        })
    }

    /// Resolve settings from the process environment and the configuration
    /// file at `config_path` (or its default location).
    pub async fn from_env(config_path: Option<PathBuf>) -> Result<Self> {
        let global = GlobalConfig::load_with_optional(config_path).await?;
        let override_value = std::env::var_os(PARAMETERS_ENV_VAR);
        let cache_dir_env = std::env::var_os(CACHE_DIR_ENV_VAR);
        Self::resolve(&global, override_value.as_deref(), cache_dir_env.as_deref())
    }

    /// The URL that will be downloaded, if any.
    pub fn parameters_url(&self) -> Option<String> {
        self.source.url_for(&self.version_tag)
    }
}

/// The cache directory selected by the environment and configuration file.
pub async fn get_cache_dir(config_path: Option<PathBuf>) -> Result<PathBuf> {
    Ok(ParametersConfig::from_env(config_path).await?.cache_dir)
}
