//! The parameter provider: lazy, load-once access to the dataset.
//!
//! A [`ParameterProvider`] owns a [`Fetcher`] and the settings that decide
//! where parameters come from. Nothing happens at construction; the first
//! call that needs a parameter runs [`load_dataset`] and every later call,
//! including concurrent ones racing the first, sees that same dataset.
//!
//! # Examples
//!
//! ```rust,no_run
//! use rpz_params::config::ParametersConfig;
//! use rpz_params::provider::ParameterProvider;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ParametersConfig::from_env(None).await?;
//! let provider = ParameterProvider::from_config(&config).await?;
//!
//! let image = provider.docker_images().await?.resolve("ubuntu", "14.04").clone();
//! println!("{} -> {}", image.display_name, image.image);
//!
//! let busybox = provider.busybox_url("x86_64").await?;
//! println!("busybox: {busybox}");
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use anyhow::Result;
use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::catalog::{ContainerImage, ImageCatalog, ResolvedRecord, VagrantBox};
use crate::config::{ParameterSource, ParametersConfig};
use crate::core::ParamsError;
use crate::dataset::Dataset;
use crate::fetch::{Fetcher, HttpFetcher};
use crate::source::{DatasetOrigin, LoadedDataset, load_dataset};

/// Section names known to the provider.
pub mod sections {
    pub const BUSYBOX_URL: &str = "busybox_url";
    pub const RPZSUDO_URL: &str = "rpzsudo_url";
    pub const DOCKER_IMAGES: &str = "docker_images";
    pub const VAGRANT_BOXES: &str = "vagrant_boxes";
    pub const VAGRANT_BOXES_X: &str = "vagrant_boxes_x";
}

/// Lazily loaded parameters.
pub struct ParameterProvider<F> {
    fetcher: F,
    source: ParameterSource,
    version_tag: String,
    loaded: OnceCell<LoadedDataset>,
    catalogs: DashMap<String, Arc<ImageCatalog<ResolvedRecord>>>,
    docker_images: OnceCell<Arc<ImageCatalog<ContainerImage>>>,
    vagrant_boxes: OnceCell<Arc<ImageCatalog<VagrantBox>>>,
    vagrant_boxes_x: OnceCell<Arc<ImageCatalog<VagrantBox>>>,
}

impl<F: Fetcher> ParameterProvider<F> {
    /// Create a provider. Nothing is fetched until a parameter is requested.
    pub fn new(fetcher: F, source: ParameterSource, version_tag: impl Into<String>) -> Self {
        Self {
            fetcher,
            source,
            version_tag: version_tag.into(),
            loaded: OnceCell::new(),
            catalogs: DashMap::new(),
            docker_images: OnceCell::new(),
            vagrant_boxes: OnceCell::new(),
            vagrant_boxes_x: OnceCell::new(),
        }
    }

    async fn loaded(&self) -> &LoadedDataset {
        self.loaded
            .get_or_init(|| async {
                let loaded = load_dataset(&self.fetcher, &self.source, &self.version_tag).await;
                debug!(
                    "Loaded parameters version {} ({})",
                    loaded.dataset.version_str(),
                    loaded.origin
                );
                loaded
            })
            .await
    }

    /// The dataset, loading it on first use.
    pub async fn dataset(&self) -> &Dataset {
        &self.loaded().await.dataset
    }

    /// How the dataset was obtained, loading it on first use.
    pub async fn origin(&self) -> &DatasetOrigin {
        &self.loaded().await.origin
    }

    /// Payload of `section`, or `None` if the dataset has no such section.
    pub async fn get_parameter(&self, section: &str) -> Option<&Value> {
        self.dataset().await.section(section)
    }

    /// The fetcher this provider downloads with.
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Where parameters come from.
    pub fn source(&self) -> &ParameterSource {
        &self.source
    }

    /// Any catalog section, compiled once and shared.
    ///
    /// # Errors
    ///
    /// - [`ParamsError::SectionNotFound`] if the dataset has no such section
    /// - [`ParamsError::InvalidSection`] / [`ParamsError::InvalidPattern`] if
    ///   the section is not a valid catalog
    pub async fn catalog(
        &self,
        section: &str,
    ) -> Result<Arc<ImageCatalog<ResolvedRecord>>, ParamsError> {
        if let Some(catalog) = self.catalogs.get(section) {
            return Ok(Arc::clone(catalog.value()));
        }

        let value = self.dataset().await.require_section(section)?;
        let catalog = Arc::new(ImageCatalog::from_section(section, value)?);
        let entry = self.catalogs.entry(section.to_string()).or_insert(catalog);
        Ok(Arc::clone(entry.value()))
    }

    /// Resolve a distribution in any catalog section.
    pub async fn resolve(
        &self,
        section: &str,
        distribution: &str,
        version: &str,
    ) -> Result<ResolvedRecord, ParamsError> {
        Ok(self.catalog(section).await?.resolve(distribution, version).clone())
    }

    /// Container images (`docker_images`), compiled once and shared.
    pub async fn docker_images(&self) -> Result<Arc<ImageCatalog<ContainerImage>>, ParamsError> {
        self.typed_catalog(&self.docker_images, sections::DOCKER_IMAGES).await
    }

    /// Virtual-machine boxes (`vagrant_boxes`), compiled once and shared.
    pub async fn vagrant_boxes(&self) -> Result<Arc<ImageCatalog<VagrantBox>>, ParamsError> {
        self.typed_catalog(&self.vagrant_boxes, sections::VAGRANT_BOXES).await
    }

    /// Virtual-machine boxes with a graphical session (`vagrant_boxes_x`),
    /// compiled once and shared.
    pub async fn vagrant_boxes_x(&self) -> Result<Arc<ImageCatalog<VagrantBox>>, ParamsError> {
        self.typed_catalog(&self.vagrant_boxes_x, sections::VAGRANT_BOXES_X).await
    }

    /// A failed build leaves `cell` empty, so the error is reported again on
    /// the next call.
    async fn typed_catalog<R>(
        &self,
        cell: &OnceCell<Arc<ImageCatalog<R>>>,
        section: &str,
    ) -> Result<Arc<ImageCatalog<R>>, ParamsError>
    where
        R: serde::de::DeserializeOwned,
    {
        cell.get_or_try_init(|| async {
            let value = self.dataset().await.require_section(section)?;
            Ok::<_, ParamsError>(Arc::new(ImageCatalog::from_section(section, value)?))
        })
        .await
        .map(Arc::clone)
    }

    /// Download URL for `arch` from a per-architecture URL section.
    pub async fn binary_url(&self, section: &str, arch: &str) -> Result<String, ParamsError> {
        let urls = self.dataset().await.binary_urls(section)?;
        Ok(urls.url_for(arch)?.to_string())
    }

    /// Download URL of the busybox binary for `arch`.
    pub async fn busybox_url(&self, arch: &str) -> Result<String, ParamsError> {
        self.binary_url(sections::BUSYBOX_URL, arch).await
    }

    /// Download URL of the rpzsudo binary for `arch`.
    pub async fn rpzsudo_url(&self, arch: &str) -> Result<String, ParamsError> {
        self.binary_url(sections::RPZSUDO_URL, arch).await
    }
}

impl ParameterProvider<HttpFetcher> {
    /// A provider downloading over HTTP as configured.
    pub async fn from_config(config: &ParametersConfig) -> Result<Self> {
        let fetcher = HttpFetcher::from_config(config).await?;
        Ok(Self::new(fetcher, config.source.clone(), config.version_tag.clone()))
    }
}
