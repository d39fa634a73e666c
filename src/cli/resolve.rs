//! `resolve` and `url`: answer the questions an unpacker asks.

use anyhow::Result;
use clap::{Args, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;

use super::common::load_provider;
use crate::catalog::{Record, ResolvedRecord};
use crate::provider::sections;

/// Resolve a distribution in a catalog section.
#[derive(Args, Debug)]
pub struct ResolveCommand {
    /// Catalog section: `docker_images`, `vagrant_boxes` or `vagrant_boxes_x`.
    section: String,

    /// Distribution name as reported by the packed machine (e.g. `Ubuntu`).
    distribution: String,

    /// Distribution version (e.g. `14.04`).
    version: String,

    /// Only print the box for this architecture (boxes only).
    #[arg(long)]
    arch: Option<String>,

    /// Print the resolved record as JSON.
    #[arg(long, conflicts_with = "arch")]
    json: bool,
}

impl ResolveCommand {
    pub async fn execute(self, config_path: Option<PathBuf>) -> Result<()> {
        let provider = load_provider(config_path).await?;
        let record = provider.resolve(&self.section, &self.distribution, &self.version).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&record)?);
            return Ok(());
        }

        match (&record, &self.arch) {
            (ResolvedRecord::Box(vm), Some(arch)) => {
                println!("{}", vm.box_for(arch)?);
            }
            (ResolvedRecord::Image(image), arch) => {
                if arch.is_some() {
                    tracing::warn!("--arch ignored: '{}' holds container images", self.section);
                }
                println!("{} ({})", image.image.bold(), record.display_name());
            }
            (ResolvedRecord::Box(vm), None) => {
                println!("{} ({})", vm.display_name.bold(), vm.distribution);
                for (arch, name) in &vm.architectures {
                    println!("  {arch}: {name}");
                }
            }
        }

        Ok(())
    }
}

/// Helper binaries with per-architecture download URLs.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tool {
    Busybox,
    Rpzsudo,
}

impl Tool {
    fn section(self) -> &'static str {
        match self {
            Self::Busybox => sections::BUSYBOX_URL,
            Self::Rpzsudo => sections::RPZSUDO_URL,
        }
    }
}

/// Print the download URL of a helper binary.
#[derive(Args, Debug)]
pub struct UrlCommand {
    /// Which binary.
    #[arg(value_enum)]
    tool: Tool,

    /// Architecture id (e.g. `x86_64`, `i686`).
    arch: String,
}

impl UrlCommand {
    pub async fn execute(self, config_path: Option<PathBuf>) -> Result<()> {
        let provider = load_provider(config_path).await?;
        let url = provider.binary_url(self.tool.section(), &self.arch).await?;
        println!("{url}");
        Ok(())
    }
}
