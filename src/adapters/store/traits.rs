//! Store abstraction traits
//!
//! This module defines the traits that store adapters must implement. The
//! staging and historical stores expose the same thin interface; the
//! coordinator decides which one plays which role.

use crate::domain::{AvailabilityStatus, ClassifiedRecord, Result};
use async_trait::async_trait;
use std::collections::HashMap;

/// Store of classified records keyed by id
///
/// Implementations back either the staging area (fully replaceable, emptied
/// by promotion) or the historical ledger (append/upsert only). The same
/// trait serves both roles; durability semantics live in the coordinator.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Read all records currently in the store
    ///
    /// # Errors
    ///
    /// Returns a `Persistence` error if the read fails.
    async fn select_all(&self) -> Result<Vec<ClassifiedRecord>>;

    /// Insert or overwrite records keyed by id
    ///
    /// Re-upserting an id already present overwrites that row and never
    /// duplicates it. Either all records are applied or an error is
    /// returned; a partially applied upsert must be surfaced as an error.
    ///
    /// # Errors
    ///
    /// Returns a `Persistence` error if the write fails.
    async fn upsert(&self, records: &[ClassifiedRecord]) -> Result<()>;

    /// Delete every record in the store
    ///
    /// # Errors
    ///
    /// Returns a `Persistence` error if the delete fails.
    async fn delete_all(&self) -> Result<()>;

    /// Number of records currently in the store
    ///
    /// # Errors
    ///
    /// Returns a `Persistence` error if the count query fails.
    async fn count(&self) -> Result<usize>;

    /// Ensure supporting tables/indexes exist
    ///
    /// Invoked best-effort at the start of each run; implementations must be
    /// idempotent. The default implementation is a no-op for backends that
    /// need no schema.
    async fn ensure_schema(&self) -> Result<()> {
        Ok(())
    }
}

/// Source of curated availability-text overrides
///
/// The classifier consults these exact-match overrides before its keyword
/// rules. The table is read once at startup; absence or load failure
/// degrades gracefully to keyword-only classification at the call site.
#[async_trait]
pub trait OverrideSource: Send + Sync {
    /// Load the (availability text -> status) override mapping
    ///
    /// # Errors
    ///
    /// Returns an error if the mapping cannot be read. Callers log the
    /// failure and continue without overrides.
    async fn load_overrides(&self) -> Result<HashMap<String, AvailabilityStatus>>;
}
