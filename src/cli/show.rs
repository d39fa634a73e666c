//! `show` and `sections`: inspect the parameters in use.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use super::common::load_provider;

/// Show the dataset summary or one section.
#[derive(Args, Debug)]
pub struct ShowCommand {
    /// Section to print as JSON (e.g. `docker_images`).
    section: Option<String>,
}

impl ShowCommand {
    pub async fn execute(self, config_path: Option<PathBuf>) -> Result<()> {
        let provider = load_provider(config_path).await?;
        let dataset = provider.dataset().await;

        match self.section {
            Some(section) => {
                let value = dataset.require_section(&section)?;
                println!("{}", serde_json::to_string_pretty(value)?);
            }
            None => {
                println!("{}", "Parameters".bold());
                println!("Version: {}", dataset.version_str());
                println!("Source:  {}", provider.source());
                println!("Origin:  {}", provider.origin().await);
                println!("Sections:");
                for name in dataset.section_names() {
                    println!("  {name}");
                }
            }
        }

        Ok(())
    }
}

/// List section names, one per line.
#[derive(Args, Debug)]
pub struct SectionsCommand {}

impl SectionsCommand {
    pub async fn execute(self, config_path: Option<PathBuf>) -> Result<()> {
        let provider = load_provider(config_path).await?;
        for name in provider.dataset().await.section_names() {
            println!("{name}");
        }
        Ok(())
    }
}
