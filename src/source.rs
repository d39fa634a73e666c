//! Obtaining the parameter dataset.
//!
//! [`load_dataset`] runs a short pipeline and falls back to the bundled
//! parameters as soon as a stage fails:
//!
//! ```text
//! fetch ──Failed──────────────┐
//!   │ Fetched(path)           │
//! parse ──Malformed (purge)───┤
//!   │ Parsed(dataset)         ├──> bundled dataset
//! version ──Incompatible──────┘
//!   │ Compatible
//!   └──> remote dataset
//! ```
//!
//! None of these failures reach the caller. Each is logged at `info` level and
//! recorded in the returned [`DatasetOrigin`].

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::ParameterSource;
use crate::constants::PARAMETERS_CACHE_NAME;
use crate::dataset::Dataset;
use crate::fetch::Fetcher;
use crate::version::{CompatibilityWindow, LooseVersion};

/// Outcome of the download stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchResult {
    /// The document is cached at this path.
    Fetched(PathBuf),
    /// Transport failure, with the error message.
    Failed(String),
}

/// Outcome of the parse stage.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseResult {
    Parsed(Dataset),
    /// The cached file is not a parameter document.
    Malformed(String),
}

/// Outcome of the version gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionCheck {
    Compatible,
    Incompatible(LooseVersion),
}

/// Why the bundled parameters were used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// The network is disabled by `REPROZIP_PARAMETERS`.
    Disabled,
    /// The download failed.
    Transport,
    /// The download is not a valid document.
    Malformed,
    /// The download's version is outside the accepted window.
    IncompatibleVersion,
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Disabled => "network disabled",
            Self::Transport => "download failed",
            Self::Malformed => "downloaded parameters are malformed",
            Self::IncompatibleVersion => "downloaded parameters have an incompatible version",
        };
        f.write_str(text)
    }
}

/// How the dataset in use was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetOrigin {
    /// Downloaded from `url` and accepted.
    Remote { url: String },
    /// The copy compiled into the binary.
    Bundled { reason: FallbackReason },
}

impl DatasetOrigin {
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote { .. })
    }
}

impl fmt::Display for DatasetOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote { url } => write!(f, "remote ({url})"),
            Self::Bundled { reason } => write!(f, "bundled ({reason})"),
        }
    }
}

/// A dataset together with its origin.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedDataset {
    pub dataset: Dataset,
    pub origin: DatasetOrigin,
}

impl LoadedDataset {
    fn bundled(reason: FallbackReason) -> Self {
        Self {
            dataset: Dataset::bundled(),
            origin: DatasetOrigin::Bundled { reason },
        }
    }
}

/// Download `url` through `fetcher`.
pub async fn fetch_parameters<F: Fetcher>(fetcher: &F, url: &str) -> FetchResult {
    match fetcher.fetch(url, PARAMETERS_CACHE_NAME).await {
        Ok(path) => FetchResult::Fetched(path),
        Err(e) => FetchResult::Failed(format!("{e:#}")),
    }
}

/// Read and parse a cached document.
///
/// An unreadable file counts as malformed.
pub async fn parse_parameters(path: &Path) -> ParseResult {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) => return ParseResult::Malformed(format!("cannot read {}: {e}", path.display())),
    };
    match Dataset::from_json(&content) {
        Ok(dataset) => ParseResult::Parsed(dataset),
        Err(e) => ParseResult::Malformed(e.to_string()),
    }
}

/// Compare the document version against `window`.
pub fn check_version(dataset: &Dataset, window: &CompatibilityWindow) -> VersionCheck {
    let version = dataset.version();
    if window.contains(&version) {
        VersionCheck::Compatible
    } else {
        VersionCheck::Incompatible(version)
    }
}

/// Obtain the parameter dataset, falling back to the bundled copy.
///
/// Never fails: every failure is logged and answered with
/// [`Dataset::bundled`].
pub async fn load_dataset<F: Fetcher>(
    fetcher: &F,
    source: &ParameterSource,
    version_tag: &str,
) -> LoadedDataset {
    let Some(url) = source.url_for(version_tag) else {
        debug!("Parameter download disabled, using bundled parameters");
        return LoadedDataset::bundled(FallbackReason::Disabled);
    };

    let path = match fetch_parameters(fetcher, &url).await {
        FetchResult::Fetched(path) => path,
        FetchResult::Failed(error) => {
            info!("Can't download parameters.json, using bundled parameters");
            debug!("Download of {} failed: {}", url, error);
            return LoadedDataset::bundled(FallbackReason::Transport);
        }
    };

    let dataset = match parse_parameters(&path).await {
        ParseResult::Parsed(dataset) => dataset,
        ParseResult::Malformed(error) => {
            info!("Downloaded parameters.json doesn't load, using bundled parameters");
            debug!("Parse error in {}: {}", path.display(), error);
            if let Err(e) = tokio::fs::remove_file(&path).await {
                debug!("Could not remove {}: {}", path.display(), e);
            }
            return LoadedDataset::bundled(FallbackReason::Malformed);
        }
    };

    let window = CompatibilityWindow::default();
    match check_version(&dataset, &window) {
        VersionCheck::Compatible => {
            debug!("Using parameters version {} from {}", dataset.version_str(), url);
            LoadedDataset {
                dataset,
                origin: DatasetOrigin::Remote { url },
            }
        }
        VersionCheck::Incompatible(version) => {
            info!(
                "Downloaded parameters.json has version {} outside {}, using bundled parameters",
                version, window
            );
            LoadedDataset::bundled(FallbackReason::IncompatibleVersion)
        }
    }
}
