//! Run summary and reporting
//!
//! This module defines structures for tracking and reporting the result of
//! one ETL run.

use std::time::Duration;

/// Row counts for both stores at one point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoreCounts {
    /// Rows in the staging store
    pub staging: usize,

    /// Rows in the historical store
    pub historical: usize,
}

/// Summary of one ETL run
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Row counts before the run
    pub counts_before: StoreCounts,

    /// Row counts after the run
    pub counts_after: StoreCounts,

    /// Staging rows promoted into the historical store
    pub promoted: usize,

    /// Raw records fetched from the upstream API
    pub fetched: usize,

    /// Classified records written into staging
    pub staged: usize,

    /// The staging clear after a successful promotion failed and was
    /// deferred to the next run (not data loss - re-promotion is idempotent)
    pub staging_clear_deferred: bool,

    /// Whether this was a dry run (no store writes)
    pub dry_run: bool,

    /// Duration of the run
    pub duration: Duration,
}

impl RunSummary {
    /// Creates a new empty run summary
    pub fn new() -> Self {
        Self {
            counts_before: StoreCounts::default(),
            counts_after: StoreCounts::default(),
            promoted: 0,
            fetched: 0,
            staged: 0,
            staging_clear_deferred: false,
            dry_run: false,
            duration: Duration::from_secs(0),
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            staging_before = self.counts_before.staging,
            historical_before = self.counts_before.historical,
            staging_after = self.counts_after.staging,
            historical_after = self.counts_after.historical,
            promoted = self.promoted,
            fetched = self.fetched,
            staged = self.staged,
            dry_run = self.dry_run,
            duration_secs = self.duration.as_secs(),
            "ETL run completed"
        );

        if self.staging_clear_deferred {
            tracing::warn!(
                "Staging clear failed after a successful promotion; \
                 the next run will re-promote the same rows"
            );
        }
    }
}

impl Default for RunSummary {
    fn default() -> Self {
        Self::new()
    }
}
