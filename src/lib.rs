//! rpz-params - remote parameters for reproducible-environment unpackers
//!
//! Unpackers that rebuild a packed experiment inside a container or a virtual
//! machine need to know which image or box matches the original operating
//! system, and where to download small helper binaries. Those answers change
//! faster than the tool is released, so they live in a versioned JSON
//! document served over HTTPS, with a copy bundled into the binary.
//!
//! # Flow
//!
//! 1. A [`provider::ParameterProvider`] is created with a [`fetch::Fetcher`]
//!    and the [`config::ParameterSource`] selected by `REPROZIP_PARAMETERS`.
//! 2. The first request for a parameter runs [`source::load_dataset`]:
//!    download, parse, version check. Any failure falls back to the bundled
//!    [`dataset::Dataset`]; the caller never sees it.
//! 3. Catalog sections are compiled into [`catalog::ImageCatalog`]s which
//!    resolve a distribution name and version to a record by ordered regex
//!    matching.
//!
//! # Modules
//!
//! - [`catalog`] - ordered pattern catalogs of images and boxes
//! - [`cli`] - the `rpz-params` diagnostic command
//! - [`config`] - configuration file and environment overrides
//! - [`constants`] - endpoint, environment variable names, version window
//! - [`core`] - error types and user-facing error rendering
//! - [`dataset`] - the parameter document and its bundled copy
//! - [`fetch`] - the download seam and its HTTPS implementation
//! - [`provider`] - lazy, load-once access to the parameters
//! - [`source`] - the fetch/parse/version-check pipeline with fallback
//! - [`version`] - loose version ordering and the compatibility window
//!
//! # Example
//!
//! ```rust,no_run
//! use rpz_params::config::ParametersConfig;
//! use rpz_params::provider::ParameterProvider;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ParametersConfig::from_env(None).await?;
//! let provider = ParameterProvider::from_config(&config).await?;
//!
//! let boxes = provider.vagrant_boxes().await?;
//! let vm = boxes.resolve("debian", "8.5");
//! println!("{}", vm.box_for("x86_64")?);
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod dataset;
pub mod fetch;
pub mod provider;
pub mod source;
pub mod version;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
