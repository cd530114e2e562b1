//! Per-row results and the run summary

use std::fmt;

/// What happened to a single subscription row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    /// Scheduled line items were applied
    Applied,
    /// The subscription had no scheduled line items
    NoChanges,
    /// Line items were present but the apply call produced no result
    NothingApplied,
    /// Line items were present and applying them failed
    ApplyFailed(String),
    /// Fetching the scheduled changes failed
    FetchFailed(String),
    /// The row had no subscription id
    MissingId,
}

impl RowOutcome {
    /// Value of the `has_scheduled_changes_data` column
    pub fn has_scheduled_changes_data(&self) -> bool {
        matches!(
            self,
            Self::Applied | Self::NothingApplied | Self::ApplyFailed(_)
        )
    }

    /// Value of the `success` column
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

impl fmt::Display for RowOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Applied => write!(f, "applied"),
            Self::NoChanges => write!(f, "no scheduled changes"),
            Self::NothingApplied => write!(f, "nothing applied"),
            Self::ApplyFailed(e) => write!(f, "apply failed: {}", e),
            Self::FetchFailed(e) => write!(f, "fetch failed: {}", e),
            Self::MissingId => write!(f, "missing subscription id"),
        }
    }
}

/// Totals for one batch run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub processed: usize,
    pub applied: usize,
    pub no_changes: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn record(&mut self, outcome: &RowOutcome) {
        self.processed += 1;
        match outcome {
            RowOutcome::Applied => self.applied += 1,
            RowOutcome::NoChanges => self.no_changes += 1,
            _ => self.failed += 1,
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} processed, {} applied, {} without scheduled changes, {} failed",
            self.processed, self.applied, self.no_changes, self.failed
        )
    }
}
