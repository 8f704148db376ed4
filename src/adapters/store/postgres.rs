//! PostgreSQL store adapter
//!
//! This module provides the pooled PostgreSQL client and the table-backed
//! implementation of the store traits. Staging and historical are two tables
//! with identical shape; a [`PgRecordStore`] binds the shared client to one
//! of them.

use crate::adapters::store::traits::{OverrideSource, RecordStore};
use crate::config::schema::PostgresConfig;
use crate::domain::{
    AvailabilityStatus, ClassifiedRecord, PersistenceError, RawUpdateRecord, Result,
    ShortfallError,
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod, Runtime};
use secrecy::ExposeSecret;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio_postgres::{NoTls, Row};

/// Pooled PostgreSQL client shared by the staging and historical stores
pub struct PostgresClient {
    pool: Pool,
    config: PostgresConfig,
}

impl PostgresClient {
    /// Creates a new client with a connection pool
    ///
    /// # Errors
    ///
    /// Returns a `Configuration` error for an invalid connection string and
    /// a `Persistence` error if the pool cannot be built.
    pub fn new(config: PostgresConfig) -> Result<Self> {
        let pg_config: tokio_postgres::Config = config
            .connection_string
            .expose_secret()
            .as_ref()
            .parse()
            .map_err(|e| {
                ShortfallError::Configuration(format!(
                    "Invalid PostgreSQL connection string: {e}"
                ))
            })?;

        let manager = Manager::from_config(
            pg_config,
            NoTls,
            ManagerConfig {
                recycling_method: RecyclingMethod::Fast,
            },
        );

        let pool = Pool::builder(manager)
            .runtime(Runtime::Tokio1)
            .max_size(config.max_connections)
            .wait_timeout(Some(Duration::from_secs(config.connection_timeout_seconds)))
            .create_timeout(Some(Duration::from_secs(config.connection_timeout_seconds)))
            .recycle_timeout(Some(Duration::from_secs(config.connection_timeout_seconds)))
            .build()
            .map_err(|e| {
                PersistenceError::ConnectionFailed(format!(
                    "Failed to create connection pool: {e}"
                ))
            })?;

        Ok(Self { pool, config })
    }

    async fn get_connection(&self) -> Result<deadpool_postgres::Object> {
        self.pool.get().await.map_err(|e| {
            PersistenceError::ConnectionFailed(format!(
                "Failed to get connection from pool: {e}"
            ))
            .into()
        })
    }

    /// Runs the idempotent schema migration
    ///
    /// # Errors
    ///
    /// Returns a `Schema` error if the DDL fails; callers treat this as
    /// best-effort.
    pub async fn ensure_schema(&self) -> Result<()> {
        let client = self.get_connection().await?;

        let migration_sql = include_str!("../../../migrations/001_initial_schema.sql");

        client
            .batch_execute(migration_sql)
            .await
            .map_err(|e| ShortfallError::Schema(format!("Failed to execute migration: {e}")))?;

        tracing::info!("PostgreSQL schema assured");
        Ok(())
    }
}

/// One table of classified records behind the shared client
pub struct PgRecordStore {
    client: Arc<PostgresClient>,
    table: String,
}

impl PgRecordStore {
    /// Creates a store bound to the given table
    ///
    /// The table name is validated at configuration load time; it is
    /// interpolated into SQL and must be a plain identifier.
    pub fn new(client: Arc<PostgresClient>, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }

    fn decode_row(&self, row: &Row) -> Result<ClassifiedRecord> {
        let decode = |e: tokio_postgres::Error| {
            ShortfallError::from(PersistenceError::DecodeFailed(format!(
                "table {}: {e}",
                self.table
            )))
        };

        let id: i64 = row.try_get("id").map_err(decode)?;
        let status_text: String = row.try_get("availability_status").map_err(decode)?;
        let availability_status = AvailabilityStatus::from_str(&status_text)
            .map_err(PersistenceError::DecodeFailed)?;

        let raw = RawUpdateRecord {
            generic_name: row.try_get("generic_name").map_err(decode)?,
            company_name: row.try_get("company_name").map_err(decode)?,
            presentation: row.try_get("presentation").map_err(decode)?,
            update_type: row.try_get("update_type").map_err(decode)?,
            update_date: row.try_get::<_, NaiveDate>("update_date").map_err(decode)?,
            availability: row.try_get("availability").map_err(decode)?,
            related_info: row.try_get("related_info").map_err(decode)?,
            resolved_note: row.try_get("resolved_note").map_err(decode)?,
            reason_for_shortage: row.try_get("reason_for_shortage").map_err(decode)?,
            therapeutic_category: row.try_get("therapeutic_category").map_err(decode)?,
            status: row.try_get("status").map_err(decode)?,
            change_date: row.try_get("change_date").map_err(decode)?,
            date_discontinued: row.try_get("date_discontinued").map_err(decode)?,
            ndc: row.try_get("ndc").map_err(decode)?,
        };

        let created_at: DateTime<Utc> = row.try_get("created_at").map_err(decode)?;

        Ok(ClassifiedRecord::new(
            id as u64,
            raw,
            availability_status,
            created_at,
        ))
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn select_all(&self) -> Result<Vec<ClassifiedRecord>> {
        let client = self.client.get_connection().await?;

        let query = format!(
            "SELECT id, generic_name, company_name, presentation, update_type, \
             update_date, availability, related_info, resolved_note, \
             reason_for_shortage, therapeutic_category, status, change_date, \
             date_discontinued, ndc, availability_status, created_at \
             FROM {} ORDER BY id",
            self.table
        );

        let rows = client
            .query(query.as_str(), &[])
            .await
            .map_err(|e| PersistenceError::QueryFailed(format!("table {}: {e}", self.table)))?;

        rows.iter().map(|row| self.decode_row(row)).collect()
    }

    async fn upsert(&self, records: &[ClassifiedRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let mut client = self.client.get_connection().await?;

        // All rows land or none do: a partially applied batch must never be
        // reported as success.
        let tx = client.transaction().await.map_err(|e| {
            PersistenceError::UpsertFailed(format!("failed to open transaction: {e}"))
        })?;

        let statement = format!(
            "INSERT INTO {} ( \
                 id, generic_name, company_name, presentation, update_type, \
                 update_date, availability, related_info, resolved_note, \
                 reason_for_shortage, therapeutic_category, status, change_date, \
                 date_discontinued, ndc, availability_status, created_at \
             ) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17) \
             ON CONFLICT (id) DO UPDATE SET \
                 update_type = EXCLUDED.update_type, \
                 availability = EXCLUDED.availability, \
                 related_info = EXCLUDED.related_info, \
                 resolved_note = EXCLUDED.resolved_note, \
                 reason_for_shortage = EXCLUDED.reason_for_shortage, \
                 therapeutic_category = EXCLUDED.therapeutic_category, \
                 status = EXCLUDED.status, \
                 change_date = EXCLUDED.change_date, \
                 date_discontinued = EXCLUDED.date_discontinued, \
                 availability_status = EXCLUDED.availability_status, \
                 created_at = EXCLUDED.created_at",
            self.table
        );

        for record in records {
            tx.execute(
                statement.as_str(),
                &[
                    &(record.id as i64),
                    &record.raw.generic_name,
                    &record.raw.company_name,
                    &record.raw.presentation,
                    &record.raw.update_type,
                    &record.raw.update_date,
                    &record.raw.availability,
                    &record.raw.related_info,
                    &record.raw.resolved_note,
                    &record.raw.reason_for_shortage,
                    &record.raw.therapeutic_category,
                    &record.raw.status,
                    &record.raw.change_date,
                    &record.raw.date_discontinued,
                    &record.raw.ndc,
                    &record.availability_status.as_str().to_string(),
                    &record.created_at,
                ],
            )
            .await
            .map_err(|e| {
                PersistenceError::UpsertFailed(format!(
                    "table {}, id {}: {e}",
                    self.table, record.id
                ))
            })?;
        }

        tx.commit().await.map_err(|e| {
            PersistenceError::UpsertFailed(format!("failed to commit: {e}")).into()
        })
    }

    async fn delete_all(&self) -> Result<()> {
        let client = self.client.get_connection().await?;

        client
            .execute(format!("DELETE FROM {}", self.table).as_str(), &[])
            .await
            .map_err(|e| PersistenceError::DeleteFailed(format!("table {}: {e}", self.table)))?;

        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        let client = self.client.get_connection().await?;

        let row = client
            .query_one(format!("SELECT COUNT(*) FROM {}", self.table).as_str(), &[])
            .await
            .map_err(|e| PersistenceError::QueryFailed(format!("table {}: {e}", self.table)))?;

        let count: i64 = row
            .try_get(0)
            .map_err(|e| PersistenceError::DecodeFailed(e.to_string()))?;
        Ok(count as usize)
    }

    async fn ensure_schema(&self) -> Result<()> {
        self.client.ensure_schema().await
    }
}

#[async_trait]
impl OverrideSource for PostgresClient {
    async fn load_overrides(&self) -> Result<HashMap<String, AvailabilityStatus>> {
        let client = self.get_connection().await?;

        let query = format!(
            "SELECT availability_text, availability_status FROM {}",
            self.config.overrides_table
        );

        let rows = client
            .query(query.as_str(), &[])
            .await
            .map_err(|e| PersistenceError::QueryFailed(format!("overrides table: {e}")))?;

        let mut overrides = HashMap::with_capacity(rows.len());
        for row in &rows {
            let text: String = row
                .try_get("availability_text")
                .map_err(|e| PersistenceError::DecodeFailed(e.to_string()))?;
            let status_text: String = row
                .try_get("availability_status")
                .map_err(|e| PersistenceError::DecodeFailed(e.to_string()))?;

            match AvailabilityStatus::from_str(&status_text) {
                Ok(status) => {
                    overrides.insert(text, status);
                }
                Err(e) => {
                    tracing::warn!(
                        availability_text = %text,
                        error = %e,
                        "Skipping override row with unknown status"
                    );
                }
            }
        }

        tracing::info!(count = overrides.len(), "Loaded availability overrides");
        Ok(overrides)
    }
}
