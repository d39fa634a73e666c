//! `cache`: manage the cached `parameters.json`.

use anyhow::Result;
use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::config::get_cache_dir;
use crate::constants::PARAMETERS_CACHE_NAME;
use crate::fetch::HttpFetcher;

#[derive(Args, Debug)]
pub struct CacheCommand {
    #[command(subcommand)]
    command: CacheSubcommands,
}

#[derive(Subcommand, Debug)]
enum CacheSubcommands {
    /// Delete the cached parameters; the next run downloads them again.
    Clear,

    /// Print where the parameters are cached.
    Path,
}

impl CacheCommand {
    pub async fn execute(self, config_path: Option<PathBuf>) -> Result<()> {
        let fetcher = HttpFetcher::new(get_cache_dir(config_path).await?);
        let cache_path = fetcher.cache_path(PARAMETERS_CACHE_NAME);

        match self.command {
            CacheSubcommands::Clear => {
                if fetcher.clear_cache(PARAMETERS_CACHE_NAME).await? {
                    println!("Removed {}", cache_path.display());
                } else {
                    println!("No cached parameters at {}", cache_path.display());
                }
            }
            CacheSubcommands::Path => println!("{}", cache_path.display()),
        }

        Ok(())
    }
}
