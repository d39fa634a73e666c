//! HTTP fetcher with a pinned certificate authority and an on-disk cache.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use reqwest::header::IF_MODIFIED_SINCE;
use tokio::fs;
use tracing::debug;

use super::{Fetcher, TrustAnchor};
use crate::config::ParametersConfig;
use crate::constants::DEFAULT_FETCH_TIMEOUT;
use crate::core::ParamsError;

/// Downloads documents over HTTP(S) into a cache directory.
///
/// # Behavior
///
/// - `https://` URLs are only fetched when a [`TrustAnchor`] is configured,
///   and only servers chaining to that anchor are accepted. Built-in roots
///   are never trusted.
/// - When the cache already holds the document, the request carries
///   `If-Modified-Since` with the file's modification time and a
///   `304 Not Modified` answer returns the cached file untouched.
/// - A successful body replaces the cached file atomically (temporary file
///   plus rename), so readers never observe a partial document.
/// - Any other status, a transport error or the timeout is an error.
///
/// # Examples
///
/// ```rust,no_run
/// use rpz_params::fetch::{Fetcher, HttpFetcher};
/// use std::path::PathBuf;
/// use std::time::Duration;
///
/// # async fn example() -> anyhow::Result<()> {
/// let fetcher = HttpFetcher::new(PathBuf::from("/tmp/rpz-cache"))
///     .with_timeout(Duration::from_secs(5));
/// let path = fetcher.fetch("http://localhost:8000/parameters/1.1.0", "parameters.json").await?;
/// println!("cached at {}", path.display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    cache_dir: PathBuf,
    trust_anchor: Option<TrustAnchor>,
    timeout: Duration,
    user_agent: String,
}

impl HttpFetcher {
    /// Create a fetcher caching into `cache_dir`, with no trust anchor.
    pub fn new(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            trust_anchor: None,
            timeout: DEFAULT_FETCH_TIMEOUT,
            user_agent: format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        }
    }

    /// Pin the certificate authority for HTTPS.
    #[must_use]
    pub fn with_trust_anchor(mut self, anchor: TrustAnchor) -> Self {
        self.trust_anchor = Some(anchor);
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build a fetcher from resolved settings, loading the configured
    /// certificate authority if there is one.
    pub async fn from_config(config: &ParametersConfig) -> Result<Self> {
        let mut fetcher = Self::new(config.cache_dir.clone()).with_timeout(config.fetch_timeout);
        if let Some(path) = &config.ca_certificate {
            fetcher = fetcher.with_trust_anchor(TrustAnchor::from_file(path).await?);
        }
        Ok(fetcher)
    }

    /// The cache directory.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Where `cache_name` is stored.
    pub fn cache_path(&self, cache_name: &str) -> PathBuf {
        self.cache_dir.join(cache_name)
    }

    /// Remove a cached document. Returns whether a file was removed.
    pub async fn clear_cache(&self, cache_name: &str) -> Result<bool, ParamsError> {
        let path = self.cache_path(cache_name);
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!("Removed cached {}", path.display());
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn build_client(&self, url: &str) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder()
            .user_agent(&self.user_agent)
            .timeout(self.timeout);

        if url.starts_with("https://") {
            let anchor = self.trust_anchor.as_ref().ok_or_else(|| ParamsError::NetworkError {
                operation: format!("GET {url}"),
                reason: "no pinned certificate authority configured".to_string(),
            })?;
            builder = builder
                .tls_built_in_root_certs(false)
                .add_root_certificate(anchor.to_certificate()?);
        }

        builder.build().context("Failed to build HTTP client")
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, cache_name: &str) -> Result<PathBuf> {
        let cache_path = self.cache_path(cache_name);
        let client = self.build_client(url)?;

        let mut request = client.get(url);
        if let Some(since) = modified_since(&cache_path).await {
            debug!("Cached {} present, sending If-Modified-Since: {}", cache_name, since);
            request = request.header(IF_MODIFIED_SINCE, since);
        }

        debug!("Downloading {}", url);
        let response = request.send().await.with_context(|| format!("Failed to download {url}"))?;

        let status = response.status();
        if status == StatusCode::NOT_MODIFIED {
            debug!("{} not modified, using cached copy", url);
            return Ok(cache_path);
        }
        if !status.is_success() {
            return Err(ParamsError::NetworkError {
                operation: format!("GET {url}"),
                reason: format!("HTTP {status}"),
            }
            .into());
        }

        let body = response
            .bytes()
            .await
            .with_context(|| format!("Failed to read response body from {url}"))?;
        write_atomic(&cache_path, &body).await?;
        debug!("Saved {} bytes to {}", body.len(), cache_path.display());

        Ok(cache_path)
    }
}

/// HTTP date of the cached file's modification time, if the file exists.
async fn modified_since(path: &Path) -> Option<String> {
    let modified = fs::metadata(path).await.ok()?.modified().ok()?;
    let modified: DateTime<Utc> = modified.into();
    Some(modified.format("%a, %d %b %Y %H:%M:%S GMT").to_string())
}

async fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create cache directory: {}", parent.display()))?;
    }

    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, content)
        .await
        .with_context(|| format!("Failed to write temp file: {}", temp_path.display()))?;
    fs::rename(&temp_path, path)
        .await
        .with_context(|| format!("Failed to rename temp file to: {}", path.display()))?;

    Ok(())
}
