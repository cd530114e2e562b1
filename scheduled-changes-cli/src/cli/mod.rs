//! Command-line arguments
//!
//! Every flag is optional and backed by an environment variable, so running
//! with no arguments reads `subscriptions.csv` using `CB_SITE_NAME` and
//! `API_KEY` from the environment (or a `.env` file).

pub mod handler;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{API_KEY_ENV, Config, SITE_NAME_ENV};
use crate::process::RowSource;
use crate::rows::DEFAULT_ID_COLUMN;

pub use handler::handle;

/// Default input/output file
pub const DEFAULT_CSV_FILE: &str = "subscriptions.csv";

#[derive(Parser, Debug)]
#[command(name = "scheduled-changes-cli")]
#[command(about = "Apply scheduled Chargebee subscription item changes for a CSV of subscriptions")]
#[command(version)]
pub struct Cli {
    /// Chargebee site name (the subdomain of <site>.chargebee.com)
    #[arg(long, env = SITE_NAME_ENV)]
    pub site: Option<String>,

    /// Chargebee API key
    #[arg(long, env = API_KEY_ENV, hide_env_values = true)]
    pub api_key: Option<String>,

    /// CSV file with subscription ids; overwritten with status columns
    #[arg(short, long, env = "CB_SUBSCRIPTIONS_CSV", default_value = DEFAULT_CSV_FILE)]
    pub file: PathBuf,

    /// Name of the column holding subscription ids
    #[arg(long, env = "CB_SUBSCRIPTION_ID_COLUMN", default_value = DEFAULT_ID_COLUMN)]
    pub id_column: String,

    /// Process a single subscription id instead of the CSV file (nothing is written)
    #[arg(short, long, env = "CB_SUBSCRIPTION_ID")]
    pub subscription_id: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, env = "CB_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Override the API base URL (defaults to https://<site>.chargebee.com/api/v2/)
    #[arg(long, env = "CB_API_BASE_URL")]
    pub base_url: Option<String>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl Cli {
    /// Build the API configuration, failing when credentials are missing
    pub fn config(&self) -> Result<Config> {
        Config::builder()
            .site_name(self.site.clone())
            .api_key(self.api_key.clone())
            .base_url(self.base_url.clone())
            .timeout(Duration::from_secs(self.timeout_secs))
            .build()
    }

    /// Pick the row source: a single id when given, otherwise the CSV file
    pub fn row_source(&self) -> RowSource {
        match self
            .subscription_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
        {
            Some(id) => RowSource::Single {
                subscription_id: id.to_string(),
                id_column: self.id_column.clone(),
            },
            None => RowSource::File {
                path: self.file.clone(),
                id_column: self.id_column.clone(),
            },
        }
    }
}
