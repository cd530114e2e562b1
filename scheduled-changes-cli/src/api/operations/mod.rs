//! Write operations against the Chargebee subscription API
//!
//! Chargebee takes form-encoded bodies with indexed array keys; the encoding
//! is kept inside the payload types so callers only deal with typed items.

pub mod update_for_items;

pub use update_for_items::UpdateForItemsPayload;
