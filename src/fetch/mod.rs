//! Fetch-and-cache collaborators.
//!
//! The resolver never talks to the network directly. It hands a URL and a
//! cache key to a [`Fetcher`], which downloads the document, persists it in
//! its cache and returns the path of the cached file. Any error returned by a
//! fetcher is treated as a transport failure and answered with the bundled
//! parameters.
//!
//! [`HttpFetcher`] is the production implementation: HTTPS with a pinned
//! [`TrustAnchor`], conditional requests against the cached copy and atomic
//! cache writes.

pub mod http;
pub mod trust;

pub use http::HttpFetcher;
pub use trust::TrustAnchor;

use anyhow::Result;
use std::future::Future;
use std::path::PathBuf;

/// Downloads a document and persists it under a cache key.
pub trait Fetcher: Send + Sync {
    /// Fetch `url`, store it as `cache_name` in the cache and return the
    /// path of the cached file.
    fn fetch(&self, url: &str, cache_name: &str) -> impl Future<Output = Result<PathBuf>> + Send;
}
