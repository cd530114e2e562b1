//! Chargebee API Module
//!
//! Typed access to the two subscription endpoints the apply flow uses:
//! retrieving a subscription with its scheduled changes, and committing
//! line-item changes through `update_for_items`.

pub mod client;
pub mod models;
pub mod operations;

pub use client::{ChargebeeClient, SubscriptionApi};
pub use models::ScheduledChangesResult;
pub use operations::UpdateForItemsPayload;
