//! Batch orchestration
//!
//! For every row: fetch the scheduled changes, apply them when line items
//! are present, and record the two status columns. A failure only affects
//! its own row; the batch always runs to the end.

pub mod apply;
pub mod outcome;

use anyhow::Result;
use colored::*;
use log::{info, warn};
use std::path::PathBuf;

pub use apply::{apply_changes, is_applied};
pub use outcome::{RowOutcome, RunSummary};

use crate::api::SubscriptionApi;
use crate::rows::{
    HAS_SCHEDULED_CHANGES_COLUMN, Row, RowSet, SUCCESS_COLUMN, flag, read_rows, write_rows,
};

/// Where the subscription ids come from, and where results go
#[derive(Debug, Clone, PartialEq)]
pub enum RowSource {
    /// CSV file, read at start and overwritten with status columns at the end
    File { path: PathBuf, id_column: String },
    /// One subscription id; results are only reported, never persisted
    Single {
        subscription_id: String,
        id_column: String,
    },
}

impl RowSource {
    pub fn id_column(&self) -> &str {
        match self {
            Self::File { id_column, .. } => id_column,
            Self::Single { id_column, .. } => id_column,
        }
    }

    pub fn load(&self) -> Result<RowSet> {
        match self {
            Self::File { path, id_column } => read_rows(path, id_column),
            Self::Single {
                subscription_id,
                id_column,
            } => Ok(RowSet::single(id_column, subscription_id)),
        }
    }

    pub fn persist(&self, row_set: &RowSet) -> Result<()> {
        match self {
            Self::File { path, .. } => write_rows(path, row_set),
            Self::Single { .. } => Ok(()),
        }
    }
}

/// Load rows, process every one of them, and persist the results
pub async fn run<A: SubscriptionApi + ?Sized>(api: &A, source: &RowSource) -> Result<RunSummary> {
    let mut row_set = source.load()?;
    if row_set.is_empty() {
        warn!("No rows with a {} value found", source.id_column());
    } else {
        info!("Loaded {} subscription rows", row_set.len());
    }

    let summary = process_rows(api, &mut row_set, source.id_column()).await;

    source.persist(&row_set)?;
    Ok(summary)
}

/// Process rows in order, writing both status columns on each
pub async fn process_rows<A: SubscriptionApi + ?Sized>(
    api: &A,
    row_set: &mut RowSet,
    id_column: &str,
) -> RunSummary {
    let mut summary = RunSummary::default();

    for row in row_set.rows.iter_mut() {
        let outcome = process_row(api, row, id_column).await;
        record_outcome(row, &outcome);
        summary.record(&outcome);
        println!();
    }

    summary
}

async fn process_row<A: SubscriptionApi + ?Sized>(
    api: &A,
    row: &Row,
    id_column: &str,
) -> RowOutcome {
    let subscription_id = match row.get(id_column).filter(|id| !id.is_empty()) {
        Some(id) => id.as_str(),
        None => {
            warn!("Skipping row with missing {}: {:?}", id_column, row);
            return RowOutcome::MissingId;
        }
    };

    println!("Processing subscription ID: {}", subscription_id.bold());

    let scheduled = match api.retrieve_with_scheduled_changes(subscription_id).await {
        Ok(scheduled) => scheduled,
        Err(e) => {
            println!(
                "{} Failed to process subscription {}: {:#}",
                "✗".red(),
                subscription_id,
                e
            );
            return RowOutcome::FetchFailed(format!("{:#}", e));
        }
    };

    if !scheduled.has_scheduled_changes() {
        println!(
            "{} No scheduled changes found for subscription {}",
            "✗".yellow(),
            subscription_id
        );
        return RowOutcome::NoChanges;
    }

    match apply_changes(api, &scheduled, subscription_id).await {
        Ok(Some(response)) if is_applied(&response) => {
            println!(
                "{} Successfully applied changes for subscription {}",
                "✓".green(),
                subscription_id
            );
            RowOutcome::Applied
        }
        Ok(_) => {
            println!(
                "{} Failed to apply changes for subscription {}",
                "✗".red(),
                subscription_id
            );
            RowOutcome::NothingApplied
        }
        Err(e) => {
            println!(
                "{} Failed to process subscription {}: {:#}",
                "✗".red(),
                subscription_id,
                e
            );
            RowOutcome::ApplyFailed(format!("{:#}", e))
        }
    }
}

fn record_outcome(row: &mut Row, outcome: &RowOutcome) {
    row.insert(
        HAS_SCHEDULED_CHANGES_COLUMN.to_string(),
        flag(outcome.has_scheduled_changes_data()).to_string(),
    );
    row.insert(
        SUCCESS_COLUMN.to_string(),
        flag(outcome.is_success()).to_string(),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ScheduledChangesResult, UpdateForItemsPayload};
    use crate::rows::DEFAULT_ID_COLUMN;
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory API: canned fetch responses per id, canned apply responses
    #[derive(Default)]
    struct FakeApi {
        scheduled: HashMap<String, Result<Value, String>>,
        apply_responses: HashMap<String, Result<Value, String>>,
        fetched: Mutex<Vec<String>>,
        applied: Mutex<Vec<(String, Value)>>,
    }

    impl FakeApi {
        fn fetch_returns(mut self, id: &str, response: Value) -> Self {
            self.scheduled.insert(id.to_string(), Ok(response));
            self
        }

        fn fetch_fails(mut self, id: &str, error: &str) -> Self {
            self.scheduled.insert(id.to_string(), Err(error.to_string()));
            self
        }

        fn apply_returns(mut self, id: &str, response: Value) -> Self {
            self.apply_responses.insert(id.to_string(), Ok(response));
            self
        }

        fn apply_fails(mut self, id: &str, error: &str) -> Self {
            self.apply_responses.insert(id.to_string(), Err(error.to_string()));
            self
        }
    }

    #[async_trait]
    impl SubscriptionApi for FakeApi {
        async fn retrieve_with_scheduled_changes(
            &self,
            subscription_id: &str,
        ) -> Result<ScheduledChangesResult> {
            self.fetched.lock().unwrap().push(subscription_id.to_string());
            match self.scheduled.get(subscription_id) {
                Some(Ok(value)) => Ok(serde_json::from_value(value.clone())?),
                Some(Err(e)) => anyhow::bail!("{}", e),
                None => anyhow::bail!("retrieve_with_scheduled_changes failed with HTTP 404 Not Found"),
            }
        }

        async fn update_for_items(
            &self,
            subscription_id: &str,
            payload: &UpdateForItemsPayload,
        ) -> Result<Value> {
            self.applied
                .lock()
                .unwrap()
                .push((subscription_id.to_string(), payload.to_json()));
            match self.apply_responses.get(subscription_id) {
                Some(Ok(value)) => Ok(value.clone()),
                Some(Err(e)) => anyhow::bail!("{}", e),
                None => Ok(json!({"subscription": {"id": subscription_id}})),
            }
        }
    }

    fn rows(ids: &[&str]) -> RowSet {
        let mut row_set = RowSet::with_columns(vec![DEFAULT_ID_COLUMN.to_string()]);
        for id in ids {
            row_set
                .rows
                .push(Row::from([(DEFAULT_ID_COLUMN.to_string(), id.to_string())]));
        }
        row_set
    }

    fn status(row: &Row) -> (&str, &str) {
        (
            row[HAS_SCHEDULED_CHANGES_COLUMN].as_str(),
            row[SUCCESS_COLUMN].as_str(),
        )
    }

    #[tokio::test]
    async fn test_no_scheduled_items() {
        let api = FakeApi::default()
            .fetch_returns("SUB1", json!({"subscription": {"subscription_items": []}}));
        let mut row_set = rows(&["SUB1"]);

        let summary = process_rows(&api, &mut row_set, DEFAULT_ID_COLUMN).await;

        assert_eq!(status(&row_set.rows[0]), ("0", "0"));
        assert_eq!(summary.no_changes, 1);
        assert!(api.applied.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_scheduled_item_applied() {
        let api = FakeApi::default()
            .fetch_returns(
                "SUB1",
                json!({"subscription": {"subscription_items": [{"item_price_id": "P1", "quantity": 2}]}}),
            )
            .apply_returns("SUB1", json!({"subscription": {"id": "SUB1", "status": "active"}}));
        let mut row_set = rows(&["SUB1"]);

        let summary = process_rows(&api, &mut row_set, DEFAULT_ID_COLUMN).await;

        assert_eq!(status(&row_set.rows[0]), ("1", "1"));
        assert_eq!(summary.applied, 1);

        let applied = api.applied.lock().unwrap();
        assert_eq!(
            applied[0],
            (
                "SUB1".to_string(),
                json!({
                    "prorate": false,
                    "invoice_immediately": false,
                    "subscription_items[item_price_id][0]": "P1",
                    "subscription_items[quantity][0]": 2
                })
            )
        );
    }

    #[tokio::test]
    async fn test_fetch_error_does_not_stop_batch() {
        let api = FakeApi::default()
            .fetch_fails("SUB1", "error sending request: connection refused")
            .fetch_returns(
                "SUB2",
                json!({"subscription": {"subscription_items": [{"item_price_id": "P2"}]}}),
            );
        let mut row_set = rows(&["SUB1", "SUB2"]);

        let summary = process_rows(&api, &mut row_set, DEFAULT_ID_COLUMN).await;

        assert_eq!(status(&row_set.rows[0]), ("0", "0"));
        assert_eq!(status(&row_set.rows[1]), ("1", "1"));
        assert_eq!(*api.fetched.lock().unwrap(), vec!["SUB1", "SUB2"]);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.applied, 1);
    }

    #[tokio::test]
    async fn test_apply_error_keeps_changes_flag() {
        let api = FakeApi::default()
            .fetch_returns(
                "SUB1",
                json!({"subscription": {"subscription_items": [{"item_price_id": "P1"}]}}),
            )
            .apply_fails("SUB1", "update_for_items failed with HTTP 400 Bad Request");
        let mut row_set = rows(&["SUB1"]);

        process_rows(&api, &mut row_set, DEFAULT_ID_COLUMN).await;

        assert_eq!(status(&row_set.rows[0]), ("1", "0"));
    }

    #[tokio::test]
    async fn test_empty_apply_response_is_failure() {
        let api = FakeApi::default()
            .fetch_returns(
                "SUB1",
                json!({"subscription": {"subscription_items": [{"item_price_id": "P1"}]}}),
            )
            .apply_returns("SUB1", json!({}));
        let mut row_set = rows(&["SUB1"]);

        let summary = process_rows(&api, &mut row_set, DEFAULT_ID_COLUMN).await;

        assert_eq!(status(&row_set.rows[0]), ("1", "0"));
        assert_eq!(summary.failed, 1);
    }

    #[tokio::test]
    async fn test_missing_id_gets_status_columns() {
        let api = FakeApi::default();
        let mut row_set = rows(&[""]);

        process_rows(&api, &mut row_set, DEFAULT_ID_COLUMN).await;

        assert_eq!(status(&row_set.rows[0]), ("0", "0"));
        assert!(api.fetched.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_run_file_source_rewrites_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subscriptions.csv");
        std::fs::write(
            &path,
            "\u{feff}subscription_id,customer\nSUB1,Acme\n,Skipped Inc\nSUB2,Globex\nSUB3,Initech\n",
        )
        .unwrap();

        let api = FakeApi::default()
            .fetch_returns("SUB1", json!({"subscription": {"subscription_items": []}}))
            .fetch_returns(
                "SUB2",
                json!({"subscription": {"subscription_items": [{"item_price_id": "P1", "quantity": 2}]}}),
            )
            .fetch_fails("SUB3", "operation timed out");

        let source = RowSource::File {
            path: path.clone(),
            id_column: DEFAULT_ID_COLUMN.to_string(),
        };
        let summary = run(&api, &source).await.unwrap();

        assert_eq!(summary.processed, 3);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "subscription_id,customer,has_scheduled_changes_data,success\n\
             SUB1,Acme,0,0\n\
             SUB2,Globex,1,1\n\
             SUB3,Initech,0,0\n"
        );
    }

    #[tokio::test]
    async fn test_run_skips_row_with_extra_cells() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subscriptions.csv");
        std::fs::write(&path, "subscription_id,customer\nSUB1,Acme,EXTRA_DATA\nSUB2,Globex\n").unwrap();

        let api = FakeApi::default()
            .fetch_returns("SUB2", json!({"subscription": {"subscription_items": []}}));
        let source = RowSource::File {
            path: path.clone(),
            id_column: DEFAULT_ID_COLUMN.to_string(),
        };

        let summary = run(&api, &source).await.unwrap();

        assert_eq!(summary.processed, 1);
        assert_eq!(*api.fetched.lock().unwrap(), vec!["SUB2"]);
    }

    #[tokio::test]
    async fn test_run_without_rows_still_adds_status_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subscriptions.csv");
        std::fs::write(&path, "subscription_id,customer\n,Nobody\n").unwrap();

        let api = FakeApi::default();
        let source = RowSource::File {
            path: path.clone(),
            id_column: DEFAULT_ID_COLUMN.to_string(),
        };

        let summary = run(&api, &source).await.unwrap();

        assert_eq!(summary, RunSummary::default());
        assert!(api.fetched.lock().unwrap().is_empty());
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "subscription_id,customer,has_scheduled_changes_data,success\n"
        );
    }

    #[tokio::test]
    async fn test_run_single_source_writes_nothing() {
        let api = FakeApi::default().fetch_returns(
            "SUB1",
            json!({"subscription": {"subscription_items": [{"item_price_id": "P1"}]}}),
        );
        let source = RowSource::Single {
            subscription_id: "SUB1".to_string(),
            id_column: DEFAULT_ID_COLUMN.to_string(),
        };

        let summary = run(&api, &source).await.unwrap();

        assert_eq!(summary.applied, 1);
        assert_eq!(api.applied.lock().unwrap().len(), 1);
    }
}
