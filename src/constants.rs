//! Global constants used throughout the rpz-params codebase.
//!
//! This module contains the remote endpoint, environment variable names,
//! timeouts and version window that are shared across modules. Defining
//! them centrally keeps the wire-level contract in one discoverable place.

use std::time::Duration;

/// Base URL of the parameter server.
///
/// The running tool's version tag is appended to this URL so the server can
/// serve parameters appropriate for that release.
pub const DEFAULT_PARAMETERS_URL: &str = "https://reprozip-stats.poly.edu/parameters/";

/// Cache key (file name) under which the downloaded parameters are persisted.
pub const PARAMETERS_CACHE_NAME: &str = "parameters.json";

/// Environment variable selecting how parameters are obtained.
///
/// See [`crate::config::ParameterSource::from_override`] for the accepted values.
pub const PARAMETERS_ENV_VAR: &str = "REPROZIP_PARAMETERS";

/// Environment variable overriding the cache directory.
pub const CACHE_DIR_ENV_VAR: &str = "RPZ_PARAMS_CACHE_DIR";

/// Environment variable overriding the global configuration file location.
pub const CONFIG_PATH_ENV_VAR: &str = "RPZ_PARAMS_CONFIG";

/// Override values that keep the network enabled with the default URL.
pub const ENABLED_OVERRIDE_VALUES: &[&str] = &["", "1", "on", "enabled", "yes", "true"];

/// Version assumed for documents that carry no `version` field.
pub const DEFAULT_DOCUMENT_VERSION: &str = "1.0";

/// Inclusive lower bound of the accepted parameter document versions.
pub const MIN_COMPATIBLE_VERSION: &str = "1.1";

/// Exclusive upper bound of the accepted parameter document versions.
pub const MAX_COMPATIBLE_VERSION: &str = "1.2";

/// Timeout for the parameter download (30 seconds).
///
/// A timed-out download is handled exactly like any other transport failure:
/// the bundled parameters are used instead.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum Levenshtein distance for "did you mean" section suggestions.
pub const MAX_SUGGESTION_DISTANCE: usize = 4;
