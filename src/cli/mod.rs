//! Command-line interface for rpz-params.
//!
//! The binary is a diagnostic front end over the library: it shows which
//! parameters are in effect and answers the same questions an unpacker asks.
//!
//! # Available Commands
//!
//! - `show [SECTION]` - dataset version and origin, or one section as JSON
//! - `sections` - list the section names of the dataset
//! - `resolve SECTION DISTRIBUTION VERSION` - resolve a distribution in a catalog
//! - `url TOOL ARCH` - download URL of an auxiliary binary
//! - `cache clear` / `cache path` - manage the cached `parameters.json`
//!
//! # Examples
//!
//! ```bash
//! # Which image would an Ubuntu 14.04 experiment run in?
//! rpz-params resolve docker_images ubuntu 14.04
//!
//! # Which box, for a 32-bit machine?
//! rpz-params resolve vagrant_boxes debian 8 --arch i686
//!
//! # Work offline with the bundled parameters
//! REPROZIP_PARAMETERS=off rpz-params show
//!
//! # See the download and fallback decisions
//! rpz-params --verbose show
//! ```

mod cache;
mod common;
mod resolve;
mod show;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Runtime configuration derived from the global flags.
///
/// Kept separate from [`Cli`] so tests can run commands with a chosen
/// configuration file and log level.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Default log level when `RUST_LOG` is not set.
    pub log_level: Option<String>,

    /// Global configuration file to use instead of the default location.
    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    /// Create an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the tracing subscriber, writing to stderr.
    ///
    /// `RUST_LOG` wins over [`log_level`](Self::log_level). Calling this twice
    /// is harmless.
    pub fn init_logging(&self) {
        let filter = match (&self.log_level, std::env::var("RUST_LOG")) {
            (_, Ok(_)) => EnvFilter::from_default_env(),
            (Some(level), Err(_)) => EnvFilter::new(level),
            (None, Err(_)) => EnvFilter::new("info"),
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

/// Remote parameter resolver for reproducible-environment unpackers.
#[derive(Parser)]
#[command(
    name = "rpz-params",
    about = "Inspect and resolve unpacker parameters",
    version,
    long_about = "Downloads the parameter document (falling back to the bundled copy) and \
                  resolves distributions to container images, virtual-machine boxes and \
                  helper binary URLs."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Show download and fallback details (same as `RUST_LOG=debug`).
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only report errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the global configuration file.
    ///
    /// Defaults to `~/.rpz-params/config.toml`, or `RPZ_PARAMS_CONFIG` when set.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the parameters in use, or one section of them.
    Show(show::ShowCommand),

    /// List the sections of the parameters in use.
    Sections(show::SectionsCommand),

    /// Resolve a distribution name and version in a catalog section.
    Resolve(resolve::ResolveCommand),

    /// Print the download URL of a helper binary.
    Url(resolve::UrlCommand),

    /// Manage the cached parameters.
    Cache(cache::CacheCommand),
}

impl Cli {
    /// Execute with the configuration given by the command-line flags.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    /// Translate the global flags into a [`CliConfig`].
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "info"
        };

        CliConfig {
            log_level: Some(log_level.to_string()),
            config_path: self.config.clone(),
        }
    }

    /// Execute with an explicit configuration.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.init_logging();

        match self.command {
            Commands::Show(cmd) => cmd.execute(config.config_path).await,
            Commands::Sections(cmd) => cmd.execute(config.config_path).await,
            Commands::Resolve(cmd) => cmd.execute(config.config_path).await,
            Commands::Url(cmd) => cmd.execute(config.config_path).await,
            Commands::Cache(cmd) => cmd.execute(config.config_path).await,
        }
    }
}
