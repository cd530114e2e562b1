//! Entry point handler for the apply run

use anyhow::{Context, Result};
use colored::*;
use log::info;

use super::Cli;
use crate::api::ChargebeeClient;
use crate::process::{self, RowSource};

/// Run the whole batch described by the parsed arguments
pub async fn handle(cli: Cli) -> Result<()> {
    if cli.no_color {
        colored::control::set_override(false);
    }

    let config = cli.config()?;
    info!("Using Chargebee site: {}", config.site_name);

    let source = cli.row_source();
    if let RowSource::File { path, .. } = &source {
        if !path.exists() {
            anyhow::bail!("Subscriptions file does not exist: {}", path.display());
        }
        println!("Reading subscriptions from: {}", path.display().to_string().cyan());
    }

    let client = ChargebeeClient::new(&config)?;
    let summary = process::run(&client, &source)
        .await
        .context("Failed to process subscriptions")?;

    if let RowSource::File { path, .. } = &source {
        println!(
            "Results written to {}",
            path.display().to_string().bright_green()
        );
    }
    println!("{}", summary.to_string().bold());

    Ok(())
}
