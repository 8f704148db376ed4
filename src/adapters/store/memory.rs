//! In-memory store adapter
//!
//! Backs the `memory` store target. Used by the test suite and for local
//! development runs that should not touch a database.

use crate::adapters::store::traits::RecordStore;
use crate::domain::{ClassifiedRecord, PersistenceError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// Mutex-guarded map store
///
/// Rows are kept in a `HashMap<u64, ClassifiedRecord>` keyed by record id,
/// giving the same conflict-key semantics as the SQL adapter's
/// `ON CONFLICT (id) DO UPDATE`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: Mutex<HashMap<u64, ClassifiedRecord>>,
}

impl MemoryStore {
    /// Creates an empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<u64, ClassifiedRecord>>> {
        self.rows
            .lock()
            .map_err(|_| PersistenceError::QueryFailed("store mutex poisoned".to_string()).into())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn select_all(&self) -> Result<Vec<ClassifiedRecord>> {
        let rows = self.lock()?;
        let mut records: Vec<ClassifiedRecord> = rows.values().cloned().collect();
        // Deterministic order for callers that iterate
        records.sort_by_key(|r| r.id);
        Ok(records)
    }

    async fn upsert(&self, records: &[ClassifiedRecord]) -> Result<()> {
        let mut rows = self.lock()?;
        for record in records {
            rows.insert(record.id, record.clone());
        }
        Ok(())
    }

    async fn delete_all(&self) -> Result<()> {
        self.lock()?.clear();
        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }
}
