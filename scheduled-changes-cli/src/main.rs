mod api;
mod cli;
mod config;
mod process;
mod rows;

use anyhow::Result;
use clap::Parser;

use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    // .env has to be loaded before clap reads env-backed arguments
    dotenvy::dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    cli::handle(cli).await
}
