//! Commit scheduled line-item changes immediately

use anyhow::{Context, Result};
use log::{error, info};
use serde_json::Value;

use crate::api::{ScheduledChangesResult, SubscriptionApi, UpdateForItemsPayload};

/// Re-submit the scheduled line items through `update_for_items`
///
/// Returns `Ok(None)` without calling the API when there are no items.
/// Errors are logged here and returned for the caller to record per row.
pub async fn apply_changes<A: SubscriptionApi + ?Sized>(
    api: &A,
    scheduled: &ScheduledChangesResult,
    subscription_id: &str,
) -> Result<Option<Value>> {
    let items = scheduled.subscription_items();
    if items.is_empty() {
        info!(
            "No subscription_items found in scheduled changes for subscription {}",
            subscription_id
        );
        return Ok(None);
    }

    let result: Result<Value> = async {
        let payload = UpdateForItemsPayload::from_items(items)?;
        api.update_for_items(subscription_id, &payload)
            .await
            .with_context(|| format!("update_for_items failed for subscription {}", subscription_id))
    }
    .await;

    match result {
        Ok(response) => Ok(Some(response)),
        Err(e) => {
            error!(
                "Error applying changes for subscription {}: {:#}",
                subscription_id, e
            );
            Err(e)
        }
    }
}

/// An apply response counts as success when it is a non-empty JSON value
pub fn is_applied(response: &Value) -> bool {
    match response {
        Value::Null => false,
        Value::Object(map) => !map.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}
