//! Test utilities for rpz-params
//!
//! Available to unit tests and, through the `test-utils` feature, to the
//! integration suite.
//!
//! - [`init_test_logging`] - one-time tracing setup for tests
//! - [`MockFetcher`] - a [`Fetcher`] that serves a canned document and counts
//!   its calls
//!
//! # Example
//!
//! ```rust,no_run
//! use rpz_params::config::ParameterSource;
//! use rpz_params::provider::ParameterProvider;
//! use rpz_params::test_utils::MockFetcher;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let temp = tempfile::TempDir::new()?;
//! let fetcher = MockFetcher::failing(temp.path(), "offline");
//! let provider = ParameterProvider::new(
//!     fetcher.clone(),
//!     ParameterSource::Remote { url: "http://params.test/".to_string() },
//!     "1.1.0",
//! );
//! assert!(provider.get_parameter("docker_images").await.is_some());
//! assert_eq!(fetcher.calls(), 1);
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use anyhow::Result;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::fetch::Fetcher;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Uses `level` when given, otherwise `RUST_LOG`; with neither, logging stays
/// off. Safe to call from every test.
///
/// ```bash
/// RUST_LOG=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}

#[derive(Debug)]
enum MockResponse {
    Document(String),
    Failure(String),
}

#[derive(Debug)]
struct MockInner {
    response: MockResponse,
    cache_dir: PathBuf,
    delay: Option<Duration>,
    calls: AtomicUsize,
    urls: Mutex<Vec<String>>,
}

/// A [`Fetcher`] with a fixed answer.
///
/// Clones share their call counter, so a test can keep a handle while the
/// provider owns another.
#[derive(Debug, Clone)]
pub struct MockFetcher {
    inner: Arc<MockInner>,
}

impl MockFetcher {
    fn new(cache_dir: &Path, response: MockResponse) -> Self {
        Self {
            inner: Arc::new(MockInner {
                response,
                cache_dir: cache_dir.to_path_buf(),
                delay: None,
                calls: AtomicUsize::new(0),
                urls: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Write `content` to the cache on every fetch.
    pub fn document(cache_dir: &Path, content: &str) -> Self {
        Self::new(cache_dir, MockResponse::Document(content.to_string()))
    }

    /// Fail every fetch with `message`.
    pub fn failing(cache_dir: &Path, message: &str) -> Self {
        Self::new(cache_dir, MockResponse::Failure(message.to_string()))
    }

    /// Sleep before answering. Must be called before cloning.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        if let Some(inner) = Arc::get_mut(&mut self.inner) {
            inner.delay = Some(delay);
        }
        self
    }

    /// Number of fetches so far.
    pub fn calls(&self) -> usize {
        self.inner.calls.load(Ordering::SeqCst)
    }

    /// URLs requested so far, in order.
    pub fn urls(&self) -> Vec<String> {
        self.inner.urls.lock().map(|urls| urls.clone()).unwrap_or_default()
    }
}

impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str, cache_name: &str) -> Result<PathBuf> {
        self.inner.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut urls) = self.inner.urls.lock() {
            urls.push(url.to_string());
        }

        if let Some(delay) = self.inner.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.inner.response {
            MockResponse::Document(content) => {
                tokio::fs::create_dir_all(&self.inner.cache_dir).await?;
                let path = self.inner.cache_dir.join(cache_name);
                tokio::fs::write(&path, content).await?;
                Ok(path)
            }
            MockResponse::Failure(message) => Err(anyhow::anyhow!("{message}")),
        }
    }
}
