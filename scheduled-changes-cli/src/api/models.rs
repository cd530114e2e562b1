//! Response models for the Chargebee subscription endpoints
//!
//! Only the fields the apply flow reads are typed; everything else is kept
//! as raw JSON so the full payload survives for logging.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Response of `GET /subscriptions/{id}/retrieve_with_scheduled_changes`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduledChangesResult {
    /// The subscription as it will look once scheduled changes take effect
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription: Option<Subscription>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Subscription object, reduced to its line items
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_items: Option<Vec<SubscriptionItem>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One priced component of a subscription
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_price_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Number>,
    /// Price in the currency's minor unit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<Number>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ScheduledChangesResult {
    /// Line items of the scheduled subscription; empty when the field is absent
    pub fn subscription_items(&self) -> &[SubscriptionItem] {
        self.subscription
            .as_ref()
            .and_then(|s| s.subscription_items.as_deref())
            .unwrap_or(&[])
    }

    /// Whether the response carries any line items to apply.
    /// A missing `subscription` or `subscription_items` counts as no changes.
    pub fn has_scheduled_changes(&self) -> bool {
        !self.subscription_items().is_empty()
    }
}
