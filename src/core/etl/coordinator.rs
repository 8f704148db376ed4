//! ETL coordinator - orchestrator of the promotion and reload cycle
//!
//! One invocation runs the linear pipeline: promote the previous staging
//! batch into the historical ledger, clear staging, fetch a fresh trailing
//! window, classify it, assign ids, and reload staging. The durability
//! contract lives here: the historical store is never truncated, staging is
//! cleared only strictly after a confirmed historical upsert, and every step
//! that can fail aborts the run at the point of failure so the next
//! scheduled invocation retries it.

use crate::adapters::openfda::{OpenFdaClient, ShortageFetcher};
use crate::adapters::store::{create_stores, RecordStore};
use crate::config::schema::ShortfallConfig;
use crate::core::classify::{Classifier, KeywordPrecedence};
use crate::core::etl::summary::{RunSummary, StoreCounts};
use crate::core::ident;
use crate::domain::{ClassifiedRecord, FetchError, RawUpdateRecord, Result, ShortfallError};
use chrono::{Duration as ChronoDuration, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Tunable run behavior, split off the full configuration
#[derive(Debug, Clone)]
pub struct EtlOptions {
    /// Trailing fetch window in days
    pub days_back: i64,

    /// Maximum records requested per fetch
    pub fetch_limit: usize,

    /// Overall bound on the fetch stage
    pub run_timeout: Duration,

    /// Skip all store writes
    pub dry_run: bool,
}

impl EtlOptions {
    fn from_config(config: &ShortfallConfig) -> Self {
        Self {
            days_back: config.openfda.days_back,
            fetch_limit: config.openfda.limit,
            run_timeout: Duration::from_secs(config.etl.run_timeout_seconds),
            dry_run: config.application.dry_run,
        }
    }
}

/// ETL coordinator
///
/// Owns the store handles, the fetch client and the classifier for the
/// lifetime of the process; each [`run`](Self::run) invocation executes one
/// complete promotion/reload cycle. At most one run can be in flight per
/// coordinator - an overlapping invocation fails fast instead of racing on
/// staging.
pub struct EtlCoordinator {
    staging: Arc<dyn RecordStore>,
    historical: Arc<dyn RecordStore>,
    fetcher: Arc<dyn ShortageFetcher>,
    classifier: Classifier,
    options: EtlOptions,
    running: Mutex<()>,
}

impl EtlCoordinator {
    /// Creates a coordinator from explicit collaborators
    pub fn new(
        staging: Arc<dyn RecordStore>,
        historical: Arc<dyn RecordStore>,
        fetcher: Arc<dyn ShortageFetcher>,
        classifier: Classifier,
        options: EtlOptions,
    ) -> Self {
        Self {
            staging,
            historical,
            fetcher,
            classifier,
            options,
            running: Mutex::new(()),
        }
    }

    /// Creates a coordinator wired from configuration
    ///
    /// Builds the stores and the OpenFDA client, and loads the classifier
    /// overrides. A failing override load degrades to keyword-only
    /// classification with a warning; it never fails the constructor.
    ///
    /// # Errors
    ///
    /// Returns an error if the stores or the fetch client cannot be created,
    /// or if a configured keyword precedence is invalid.
    pub async fn from_config(config: &ShortfallConfig) -> Result<Self> {
        let stores = create_stores(config)?;
        let fetcher = Arc::new(OpenFdaClient::new(config.openfda.clone())?);

        let precedence = match &config.classifier.precedence {
            Some(phrases) => KeywordPrecedence::from_phrases(phrases)
                .map_err(ShortfallError::Configuration)?,
            None => KeywordPrecedence::default(),
        };

        let overrides = match &stores.overrides {
            Some(source) => match source.load_overrides().await {
                Ok(map) => map,
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        "Failed to load availability overrides; \
                         continuing with keyword-only classification"
                    );
                    HashMap::new()
                }
            },
            None => HashMap::new(),
        };

        let classifier = Classifier::new(overrides, precedence);
        tracing::info!(
            override_count = classifier.override_count(),
            "Classifier initialized"
        );

        Ok(Self::new(
            stores.staging,
            stores.historical,
            fetcher,
            classifier,
            EtlOptions::from_config(config),
        ))
    }

    /// Executes one ETL run
    ///
    /// Steps, in order:
    /// 1. Best-effort schema assurance (failure logged, never aborts).
    /// 2. Promote staging into historical; clear staging only on confirmed
    ///    success. An upsert failure aborts with staging untouched; a clear
    ///    failure after a successful upsert is deferred to the next run.
    /// 3. Fetch the trailing window, bounded by the run timeout.
    /// 4. Classify, assign ids against the freshly loaded union of live ids,
    ///    and upsert into staging.
    ///
    /// # Errors
    ///
    /// Returns the error of whichever step aborted the run, or an `Etl`
    /// error if another run is already in flight.
    pub async fn run(&self) -> Result<RunSummary> {
        let _guard = self.running.try_lock().map_err(|_| {
            ShortfallError::Etl("an ETL run is already in progress".to_string())
        })?;

        let start_time = Instant::now();
        let mut summary = RunSummary::new();
        summary.dry_run = self.options.dry_run;

        tracing::info!(dry_run = self.options.dry_run, "Starting ETL run");

        if let Err(e) = self.staging.ensure_schema().await {
            tracing::warn!(error = %e, "Schema assurance failed; continuing");
        }

        summary.counts_before = self.store_counts().await?;

        let (promoted, clear_deferred) = self.promote().await?;
        summary.promoted = promoted;
        summary.staging_clear_deferred = clear_deferred;

        let raw_records = self.fetch_window().await?;
        summary.fetched = raw_records.len();

        summary.staged = self.reload_staging(raw_records).await?;

        summary.counts_after = self.store_counts().await?;
        summary = summary.with_duration(start_time.elapsed());
        summary.log_summary();

        Ok(summary)
    }

    async fn store_counts(&self) -> Result<StoreCounts> {
        Ok(StoreCounts {
            staging: self.staging.count().await?,
            historical: self.historical.count().await?,
        })
    }

    /// Promote staging rows into historical, then clear staging
    ///
    /// Returns the number of promoted rows and whether the staging clear was
    /// deferred.
    async fn promote(&self) -> Result<(usize, bool)> {
        let rows = self.staging.select_all().await?;

        if rows.is_empty() {
            tracing::info!("Staging is empty - nothing to promote");
            return Ok((0, false));
        }

        if self.options.dry_run {
            tracing::info!(
                count = rows.len(),
                "DRY RUN: would promote staging rows into historical"
            );
            return Ok((rows.len(), false));
        }

        // Upsert keyed by id: re-promoting rows that already made it into
        // historical on a previous, partially failed run overwrites them
        // instead of duplicating.
        self.historical.upsert(&rows).await?;
        tracing::info!(count = rows.len(), "Promoted staging rows into historical");

        let clear_deferred = match self.staging.delete_all().await {
            Ok(()) => false,
            Err(e) => {
                // Historical is already durable; the pending rows are a
                // delayed cleanup, not data loss.
                tracing::warn!(
                    error = %e,
                    "Failed to clear staging after promotion; deferring to next run"
                );
                true
            }
        };

        Ok((rows.len(), clear_deferred))
    }

    /// Fetch the trailing window, bounded by the run timeout
    async fn fetch_window(&self) -> Result<Vec<RawUpdateRecord>> {
        let end_date = Utc::now().date_naive();
        let start_date = end_date - ChronoDuration::days(self.options.days_back);

        tokio::time::timeout(
            self.options.run_timeout,
            self.fetcher
                .fetch(start_date, end_date, self.options.fetch_limit),
        )
        .await
        .map_err(|_| {
            FetchError::Timeout(format!(
                "run exceeded {} seconds",
                self.options.run_timeout.as_secs()
            ))
        })?
    }

    /// Classify fetched records, assign ids, and upsert them into staging
    async fn reload_staging(&self, raw_records: Vec<RawUpdateRecord>) -> Result<usize> {
        if raw_records.is_empty() {
            tracing::info!("No new reports in the fetch window");
            return Ok(0);
        }

        // The live id set is reloaded from both stores on every run; caching
        // it across runs would make collision probing disagree with what is
        // actually stored.
        let mut known: HashMap<String, u64> = HashMap::new();
        let mut taken: HashSet<u64> = HashSet::new();
        for record in self
            .historical
            .select_all()
            .await?
            .iter()
            .chain(self.staging.select_all().await?.iter())
        {
            known.insert(ident::identity_key(&record.raw), record.id);
            taken.insert(record.id);
        }

        let created_at = Utc::now();
        let mut classified = Vec::with_capacity(raw_records.len());
        for raw in raw_records {
            let status =
                self.classifier
                    .classify(&raw.availability, &raw.related_info, &raw.status);

            // A record whose key fields match an already-stored row keeps
            // that row's id, so the staging upsert (and any later
            // re-promotion) overwrites instead of duplicating. Only novel
            // content allocates a new id.
            let key = ident::identity_key(&raw);
            let id = match known.get(&key) {
                Some(existing) => *existing,
                None => {
                    let id = ident::assign_id(&raw, &mut taken);
                    known.insert(key, id);
                    id
                }
            };

            classified.push(ClassifiedRecord::new(id, raw, status, created_at));
        }

        if self.options.dry_run {
            tracing::info!(
                count = classified.len(),
                "DRY RUN: would upsert classified records into staging"
            );
            return Ok(classified.len());
        }

        self.staging.upsert(&classified).await?;
        tracing::info!(count = classified.len(), "Staged classified records");

        Ok(classified.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::store::MemoryStore;
    use crate::domain::AvailabilityStatus;
    use async_trait::async_trait;
    use chrono::NaiveDate;

    struct FixedFetcher {
        records: Vec<RawUpdateRecord>,
    }

    #[async_trait]
    impl ShortageFetcher for FixedFetcher {
        async fn fetch(
            &self,
            _start_date: NaiveDate,
            _end_date: NaiveDate,
            _limit: usize,
        ) -> Result<Vec<RawUpdateRecord>> {
            Ok(self.records.clone())
        }
    }

    fn raw(name: &str, availability: &str) -> RawUpdateRecord {
        RawUpdateRecord {
            generic_name: name.to_string(),
            company_name: "Acme Pharma".to_string(),
            presentation: "10mg tablet".to_string(),
            update_type: "New".to_string(),
            update_date: "2025-06-01".parse().unwrap(),
            availability: availability.to_string(),
            related_info: String::new(),
            resolved_note: None,
            reason_for_shortage: None,
            therapeutic_category: "Cardiology".to_string(),
            status: "Current".to_string(),
            change_date: None,
            date_discontinued: None,
            ndc: "0002-1433-80".to_string(),
        }
    }

    fn options() -> EtlOptions {
        EtlOptions {
            days_back: 15,
            fetch_limit: 1000,
            run_timeout: Duration::from_secs(60),
            dry_run: false,
        }
    }

    fn coordinator(records: Vec<RawUpdateRecord>) -> EtlCoordinator {
        EtlCoordinator::new(
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryStore::new()),
            Arc::new(FixedFetcher { records }),
            Classifier::keyword_only(),
            options(),
        )
    }

    #[tokio::test]
    async fn test_run_stages_classified_records() {
        let coordinator = coordinator(vec![
            raw("amoxicillin", "Product on backorder"),
            raw("heparin", "Available"),
        ]);

        let summary = coordinator.run().await.unwrap();

        assert_eq!(summary.fetched, 2);
        assert_eq!(summary.staged, 2);
        assert_eq!(summary.counts_after.staging, 2);
        assert_eq!(summary.counts_after.historical, 0);

        let staged = coordinator.staging.select_all().await.unwrap();
        let amoxicillin = staged
            .iter()
            .find(|r| r.generic_name() == "amoxicillin")
            .unwrap();
        assert_eq!(
            amoxicillin.availability_status,
            AvailabilityStatus::NotAvailable
        );
    }

    #[tokio::test]
    async fn test_second_run_promotes_first_batch() {
        let coordinator = coordinator(vec![raw("amoxicillin", "Available")]);

        coordinator.run().await.unwrap();
        let summary = coordinator.run().await.unwrap();

        assert_eq!(summary.promoted, 1);
        assert_eq!(summary.counts_after.historical, 1);
        // Re-fetched identical record keeps its id and re-enters staging
        assert_eq!(summary.counts_after.staging, 1);

        let staged = coordinator.staging.select_all().await.unwrap();
        let historical = coordinator.historical.select_all().await.unwrap();
        assert_eq!(staged[0].id, historical[0].id);
    }

    #[tokio::test]
    async fn test_dry_run_writes_nothing() {
        let staging = Arc::new(MemoryStore::new());
        let historical = Arc::new(MemoryStore::new());
        let coordinator = EtlCoordinator::new(
            staging.clone(),
            historical.clone(),
            Arc::new(FixedFetcher {
                records: vec![raw("amoxicillin", "Available")],
            }),
            Classifier::keyword_only(),
            EtlOptions {
                dry_run: true,
                ..options()
            },
        );

        let summary = coordinator.run().await.unwrap();

        assert!(summary.dry_run);
        assert_eq!(summary.fetched, 1);
        assert_eq!(summary.staged, 1);
        assert_eq!(staging.count().await.unwrap(), 0);
        assert_eq!(historical.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_identical_records_within_batch_share_one_id() {
        let coordinator = coordinator(vec![
            raw("amoxicillin", "Available"),
            raw("amoxicillin", "Available"),
        ]);

        let summary = coordinator.run().await.unwrap();

        // Both map to one row: same key fields, same id, upsert overwrites
        assert_eq!(summary.fetched, 2);
        assert_eq!(summary.counts_after.staging, 1);
    }
}
