//! Subscription CSV rows
//!
//! The whole file is read up front, rows are mutated in memory while the
//! batch runs, and the file is overwritten once at the end.

pub mod reader;
pub mod writer;

use std::collections::HashMap;

pub use reader::read_rows;
pub use writer::write_rows;

/// Default name of the column holding the subscription id
pub const DEFAULT_ID_COLUMN: &str = "subscription_id";
/// Derived column: "1" when the subscription had line items scheduled
pub const HAS_SCHEDULED_CHANGES_COLUMN: &str = "has_scheduled_changes_data";
/// Derived column: "1" when the changes were applied
pub const SUCCESS_COLUMN: &str = "success";

/// One CSV record keyed by normalized column name
pub type Row = HashMap<String, String>;

/// Rows plus the column order used when writing them back
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSet {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl RowSet {
    /// Build a row set from header columns, appending the status columns
    pub fn with_columns(mut columns: Vec<String>) -> Self {
        for status in [HAS_SCHEDULED_CHANGES_COLUMN, SUCCESS_COLUMN] {
            if !columns.iter().any(|c| c == status) {
                columns.push(status.to_string());
            }
        }

        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Single in-memory row for a one-off subscription id
    pub fn single(id_column: &str, subscription_id: &str) -> Self {
        let mut row_set = Self::with_columns(vec![id_column.to_string()]);
        row_set
            .rows
            .push(Row::from([(id_column.to_string(), subscription_id.to_string())]));
        row_set
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Status column encoding
pub fn flag(value: bool) -> &'static str {
    if value { "1" } else { "0" }
}
