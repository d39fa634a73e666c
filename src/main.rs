//! rpz-params CLI entry point
//!
//! Parses arguments, runs the command and renders failures with
//! [`user_friendly_error`].

use anyhow::Result;
use clap::Parser;
use rpz_params::cli;
use rpz_params::core::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            user_friendly_error(e).display();
            std::process::exit(1);
        }
    }
}
