//! Helpers shared by the commands.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::debug;

use crate::config::ParametersConfig;
use crate::fetch::HttpFetcher;
use crate::provider::ParameterProvider;

/// Resolve settings and build a provider for a command.
pub(super) async fn load_provider(
    config_path: Option<PathBuf>,
) -> Result<ParameterProvider<HttpFetcher>> {
    let config = ParametersConfig::from_env(config_path)
        .await
        .context("Failed to load configuration")?;
    debug!("Parameter source: {}", config.source);
    debug!("Cache directory: {}", config.cache_dir.display());

    ParameterProvider::from_config(&config).await
}
