//! OpenFDA adapter
//!
//! The fetch collaborator: a read-only, capped HTTP query against the
//! upstream drug shortages reporting API, filtered by an update-date range.

pub mod client;
pub mod models;

use crate::domain::{RawUpdateRecord, Result};
use async_trait::async_trait;
use chrono::NaiveDate;

pub use client::OpenFdaClient;

/// Fetches raw shortage reports for a date window
///
/// Implemented by the OpenFDA HTTP client in production and by scripted
/// fakes in tests.
#[async_trait]
pub trait ShortageFetcher: Send + Sync {
    /// Fetch reports whose update date falls in `[start_date, end_date]`
    ///
    /// # Errors
    ///
    /// Returns a `Fetch` error on network/API failure and a `Parse` error on
    /// a malformed payload.
    async fn fetch(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        limit: usize,
    ) -> Result<Vec<RawUpdateRecord>>;
}
