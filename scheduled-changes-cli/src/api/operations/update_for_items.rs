//! Payload for `POST /subscriptions/{id}/update_for_items`

use anyhow::{Context, Result};
use serde_json::{Map, Number, Value};

use crate::api::models::SubscriptionItem;

/// Line-item change to commit on a subscription
#[derive(Debug, Clone, PartialEq)]
pub struct ItemUpdate {
    pub item_price_id: String,
    pub quantity: Option<Number>,
    pub unit_price: Option<Number>,
}

/// Body of an `update_for_items` call
///
/// Encodes to the flat form Chargebee expects:
/// `subscription_items[<field>][<index>]=<value>` per item, plus the
/// top-level `prorate` and `invoice_immediately` flags.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateForItemsPayload {
    pub prorate: bool,
    pub invoice_immediately: bool,
    pub items: Vec<ItemUpdate>,
}

impl ItemUpdate {
    /// Take the fields we re-submit from a scheduled line item
    pub fn from_item(item: &SubscriptionItem) -> Result<Self> {
        let item_price_id = item
            .item_price_id
            .clone()
            .context("Subscription item has no item_price_id")?;

        Ok(Self {
            item_price_id,
            quantity: item.quantity.clone(),
            unit_price: item.unit_price.clone(),
        })
    }
}

impl UpdateForItemsPayload {
    /// Build a payload applying the given items without proration or an
    /// immediate invoice
    pub fn from_items(items: &[SubscriptionItem]) -> Result<Self> {
        let items = items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                ItemUpdate::from_item(item)
                    .with_context(|| format!("Invalid subscription item at index {}", index))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            prorate: false,
            invoice_immediately: false,
            items,
        })
    }

    /// Key/value pairs in request order, ready for form encoding
    pub fn form_fields(&self) -> Vec<(String, String)> {
        let mut fields = vec![
            ("prorate".to_string(), self.prorate.to_string()),
            ("invoice_immediately".to_string(), self.invoice_immediately.to_string()),
        ];

        for (index, item) in self.items.iter().enumerate() {
            fields.push((item_key("item_price_id", index), item.item_price_id.clone()));
            if let Some(quantity) = &item.quantity {
                fields.push((item_key("quantity", index), quantity.to_string()));
            }
            if let Some(unit_price) = &item.unit_price {
                fields.push((item_key("unit_price", index), unit_price.to_string()));
            }
        }

        fields
    }

    /// Same keys as [`form_fields`](Self::form_fields) with typed JSON values, for logging
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        map.insert("prorate".to_string(), Value::Bool(self.prorate));
        map.insert(
            "invoice_immediately".to_string(),
            Value::Bool(self.invoice_immediately),
        );

        for (index, item) in self.items.iter().enumerate() {
            map.insert(
                item_key("item_price_id", index),
                Value::String(item.item_price_id.clone()),
            );
            if let Some(quantity) = &item.quantity {
                map.insert(item_key("quantity", index), Value::Number(quantity.clone()));
            }
            if let Some(unit_price) = &item.unit_price {
                map.insert(item_key("unit_price", index), Value::Number(unit_price.clone()));
            }
        }

        Value::Object(map)
    }
}

fn item_key(field: &str, index: usize) -> String {
    format!("subscription_items[{}][{}]", field, index)
}
