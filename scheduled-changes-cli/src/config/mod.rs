//! Runtime configuration for the Chargebee API client
//!
//! Built once in `main` from CLI flags / environment variables and passed by
//! reference to everything that talks to the API.

use anyhow::{Result, bail};
use std::fmt;
use std::time::Duration;

/// Environment variable holding the Chargebee site (subdomain)
pub const SITE_NAME_ENV: &str = "CB_SITE_NAME";
/// Environment variable holding the Chargebee API key
pub const API_KEY_ENV: &str = "API_KEY";

/// Configuration for talking to a single Chargebee site
#[derive(Clone)]
pub struct Config {
    /// Site subdomain, e.g. `acme-test` for `acme-test.chargebee.com`
    pub site_name: String,
    /// API key, sent as the Basic auth username with an empty password
    pub api_key: String,
    /// Base URL of the v2 API, always ending with `/`
    pub base_url: String,
    pub http: HttpConfig,
}

/// HTTP client timeouts
#[derive(Debug, Clone, PartialEq)]
pub struct HttpConfig {
    /// Total time allowed for one request, including reading the body
    pub timeout: Duration,
    /// Time allowed for establishing the connection
    pub connect_timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

// The API key must never end up in logs
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("site_name", &self.site_name)
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("http", &self.http)
            .finish()
    }
}

impl Config {
    /// Create a new builder for Config
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Default API base URL for a site
    pub fn site_base_url(site_name: &str) -> String {
        format!("https://{}.chargebee.com/api/v2/", site_name)
    }
}

/// Builder for [`Config`]
///
/// Site name and API key are mandatory; `build` fails naming the
/// environment variable that should have supplied the missing value.
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    site_name: Option<String>,
    api_key: Option<String>,
    base_url: Option<String>,
    http: HttpConfig,
}

impl ConfigBuilder {
    pub fn site_name(mut self, site_name: Option<String>) -> Self {
        self.site_name = site_name;
        self
    }

    pub fn api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    /// Override the base URL derived from the site name
    pub fn base_url(mut self, base_url: Option<String>) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.http.timeout = timeout;
        self
    }

    /// Validate and build the final configuration
    pub fn build(self) -> Result<Config> {
        let site_name = non_blank(self.site_name)
            .ok_or_else(|| anyhow::anyhow!("{} is not set in the environment variables", SITE_NAME_ENV))?;
        let api_key = non_blank(self.api_key)
            .ok_or_else(|| anyhow::anyhow!("{} is not set in the environment variables", API_KEY_ENV))?;

        if self.http.timeout.is_zero() {
            bail!("Request timeout must be greater than zero");
        }

        let mut base_url = non_blank(self.base_url).unwrap_or_else(|| Config::site_base_url(&site_name));
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Ok(Config {
            site_name,
            api_key,
            base_url,
            http: self.http,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
