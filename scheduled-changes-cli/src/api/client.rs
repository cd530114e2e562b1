//! HTTP client for the Chargebee v2 subscription endpoints

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, info};
use reqwest::Response;
use serde_json::Value;
use std::fmt;

use super::models::ScheduledChangesResult;
use super::operations::UpdateForItemsPayload;
use crate::config::Config;

/// Subscription calls the apply flow depends on
#[async_trait]
pub trait SubscriptionApi: Send + Sync {
    /// Fetch a subscription with its scheduled changes applied
    async fn retrieve_with_scheduled_changes(
        &self,
        subscription_id: &str,
    ) -> Result<ScheduledChangesResult>;

    /// Replace the subscription's line items immediately, returning the raw response
    async fn update_for_items(
        &self,
        subscription_id: &str,
        payload: &UpdateForItemsPayload,
    ) -> Result<Value>;
}

/// Chargebee API client authenticated with a site API key
#[derive(Clone)]
pub struct ChargebeeClient {
    base_url: String,
    api_key: String,
    http_client: reqwest::Client,
}

impl fmt::Debug for ChargebeeClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChargebeeClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl ChargebeeClient {
    /// Create a client with the configured timeouts
    pub fn new(config: &Config) -> Result<Self> {
        let user_agent = concat!(env!("CARGO_PKG_NAME"), '/', env!("CARGO_PKG_VERSION"));

        let http_client = reqwest::Client::builder()
            .timeout(config.http.timeout)
            .connect_timeout(config.http.connect_timeout)
            .user_agent(user_agent)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            http_client,
        })
    }

    /// URL of a subscription action, e.g. `.../subscriptions/{id}/update_for_items`
    fn subscription_url(&self, subscription_id: &str, action: &str) -> String {
        format!(
            "{}subscriptions/{}/{}",
            self.base_url,
            urlencoding::encode(subscription_id),
            action
        )
    }
}

#[async_trait]
impl SubscriptionApi for ChargebeeClient {
    async fn retrieve_with_scheduled_changes(
        &self,
        subscription_id: &str,
    ) -> Result<ScheduledChangesResult> {
        let url = self.subscription_url(subscription_id, "retrieve_with_scheduled_changes");
        debug!("GET {}", url);

        let response = self
            .http_client
            .get(&url)
            .basic_auth(&self.api_key, Some(""))
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", url))?;

        let raw = read_json(response, "retrieve_with_scheduled_changes").await?;
        info!(
            "scheduled changes for subscription ID {}:\n{}",
            subscription_id,
            pretty(&raw)
        );

        serde_json::from_value(raw).context("Failed to parse scheduled changes response")
    }

    async fn update_for_items(
        &self,
        subscription_id: &str,
        payload: &UpdateForItemsPayload,
    ) -> Result<Value> {
        let url = self.subscription_url(subscription_id, "update_for_items");
        info!(
            "payload for subscription ID {}:\n{}",
            subscription_id,
            pretty(&payload.to_json())
        );
        debug!("POST {}", url);

        let response = self
            .http_client
            .post(&url)
            .basic_auth(&self.api_key, Some(""))
            .form(&payload.form_fields())
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", url))?;

        let raw = read_json(response, "update_for_items").await?;
        info!(
            "apply changes response for subscription ID {}:\n{}",
            subscription_id,
            pretty(&raw)
        );

        Ok(raw)
    }
}

/// Fail on non-2xx with the vendor's error body, otherwise decode JSON
async fn read_json(response: Response, action: &str) -> Result<Value> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        anyhow::bail!("{} failed with HTTP {}: {}", action, status, body);
    }

    response
        .json::<Value>()
        .await
        .with_context(|| format!("Failed to decode {} response as JSON", action))
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
