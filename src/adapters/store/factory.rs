//! Store factory
//!
//! Creates the staging and historical stores (and the override source, when
//! one is configured) from configuration. Both stores share one underlying
//! client so a run uses a single connection pool.

use crate::adapters::reference::FileOverrides;
use crate::adapters::store::memory::MemoryStore;
use crate::adapters::store::postgres::{PgRecordStore, PostgresClient};
use crate::adapters::store::traits::{OverrideSource, RecordStore};
use crate::config::schema::{ShortfallConfig, StoreTarget};
use crate::domain::{Result, ShortfallError};
use std::sync::Arc;

/// Staging store, historical store, and optional override source
pub struct Stores {
    /// Holding area for the latest unpromoted batch
    pub staging: Arc<dyn RecordStore>,

    /// Append/upsert ledger of promoted records
    pub historical: Arc<dyn RecordStore>,

    /// Source of curated classifier overrides, if any is configured
    pub overrides: Option<Arc<dyn OverrideSource>>,
}

/// Create stores based on the configured target
///
/// With the `postgres` target, a file-based override source configured under
/// `[classifier]` takes precedence over the database overrides table.
///
/// # Errors
///
/// Returns an error if the backing client cannot be created.
pub fn create_stores(config: &ShortfallConfig) -> Result<Stores> {
    let file_overrides: Option<Arc<dyn OverrideSource>> = config
        .classifier
        .overrides_path
        .as_ref()
        .map(|path| Arc::new(FileOverrides::new(path)) as Arc<dyn OverrideSource>);

    match config.store_target {
        StoreTarget::Postgres => {
            let pg_config = config.postgres.as_ref().ok_or_else(|| {
                ShortfallError::Configuration(
                    "postgres configuration is required when store_target = 'postgres'"
                        .to_string(),
                )
            })?;

            tracing::info!("Creating PostgreSQL stores");
            let client = Arc::new(PostgresClient::new(pg_config.clone())?);

            let staging = Arc::new(PgRecordStore::new(
                client.clone(),
                pg_config.staging_table.clone(),
            ));
            let historical = Arc::new(PgRecordStore::new(
                client.clone(),
                pg_config.historical_table.clone(),
            ));

            let overrides = file_overrides
                .or_else(|| Some(client.clone() as Arc<dyn OverrideSource>));

            Ok(Stores {
                staging,
                historical,
                overrides,
            })
        }
        StoreTarget::Memory => {
            tracing::info!("Creating in-memory stores");
            Ok(Stores {
                staging: Arc::new(MemoryStore::new()),
                historical: Arc::new(MemoryStore::new()),
                overrides: file_overrides,
            })
        }
    }
}
