//! Integration tests for the promotion/reload cycle
//!
//! These tests exercise the durability contract of the coordinator against
//! in-memory stores with injected faults: idempotent re-promotion, deferred
//! staging clears, and aborts that leave the stores untouched.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use shortfall::adapters::openfda::ShortageFetcher;
use shortfall::adapters::store::{MemoryStore, RecordStore};
use shortfall::core::classify::Classifier;
use shortfall::core::etl::{EtlCoordinator, EtlOptions};
use shortfall::core::ident;
use shortfall::domain::{
    AvailabilityStatus, ClassifiedRecord, FetchError, PersistenceError, RawUpdateRecord, Result,
    ShortfallError,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Fetcher returning one scripted batch per run, then nothing
struct ScriptedFetcher {
    batches: Mutex<Vec<Vec<RawUpdateRecord>>>,
}

impl ScriptedFetcher {
    fn new(batches: Vec<Vec<RawUpdateRecord>>) -> Self {
        Self {
            batches: Mutex::new(batches),
        }
    }

    fn empty() -> Self {
        Self::new(vec![])
    }
}

#[async_trait]
impl ShortageFetcher for ScriptedFetcher {
    async fn fetch(
        &self,
        _start_date: NaiveDate,
        _end_date: NaiveDate,
        _limit: usize,
    ) -> Result<Vec<RawUpdateRecord>> {
        let mut batches = self.batches.lock().unwrap();
        if batches.is_empty() {
            Ok(vec![])
        } else {
            Ok(batches.remove(0))
        }
    }
}

/// Fetcher that always fails
struct FailingFetcher;

#[async_trait]
impl ShortageFetcher for FailingFetcher {
    async fn fetch(
        &self,
        _start_date: NaiveDate,
        _end_date: NaiveDate,
        _limit: usize,
    ) -> Result<Vec<RawUpdateRecord>> {
        Err(FetchError::ConnectionFailed("connection refused".to_string()).into())
    }
}

/// Store wrapper with switchable failure injection
struct FaultyStore {
    inner: MemoryStore,
    fail_upsert: AtomicBool,
    fail_delete: AtomicBool,
}

impl FaultyStore {
    fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            fail_upsert: AtomicBool::new(false),
            fail_delete: AtomicBool::new(false),
        }
    }

    fn set_fail_upsert(&self, fail: bool) {
        self.fail_upsert.store(fail, Ordering::SeqCst);
    }

    fn set_fail_delete(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl RecordStore for FaultyStore {
    async fn select_all(&self) -> Result<Vec<ClassifiedRecord>> {
        self.inner.select_all().await
    }

    async fn upsert(&self, records: &[ClassifiedRecord]) -> Result<()> {
        if self.fail_upsert.load(Ordering::SeqCst) {
            return Err(PersistenceError::UpsertFailed("injected fault".to_string()).into());
        }
        self.inner.upsert(records).await
    }

    async fn delete_all(&self) -> Result<()> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(PersistenceError::DeleteFailed("injected fault".to_string()).into());
        }
        self.inner.delete_all().await
    }

    async fn count(&self) -> Result<usize> {
        self.inner.count().await
    }
}

fn raw(name: &str, date: &str, availability: &str) -> RawUpdateRecord {
    RawUpdateRecord {
        generic_name: name.to_string(),
        company_name: "Acme Pharma".to_string(),
        presentation: "10mg tablet".to_string(),
        update_type: "New".to_string(),
        update_date: date.parse().unwrap(),
        availability: availability.to_string(),
        related_info: String::new(),
        resolved_note: None,
        reason_for_shortage: None,
        therapeutic_category: "Cardiology".to_string(),
        status: "Current".to_string(),
        change_date: None,
        date_discontinued: None,
        ndc: format!("0002-{}-80", name.len()),
    }
}

/// Classifies and id-assigns a batch the way the pipeline would
fn classified_batch(raws: &[RawUpdateRecord]) -> Vec<ClassifiedRecord> {
    let classifier = Classifier::keyword_only();
    let mut ids = HashSet::new();
    raws.iter()
        .map(|r| {
            let status = classifier.classify(&r.availability, &r.related_info, &r.status);
            ClassifiedRecord::new(ident::assign_id(r, &mut ids), r.clone(), status, Utc::now())
        })
        .collect()
}

fn options() -> EtlOptions {
    EtlOptions {
        days_back: 15,
        fetch_limit: 1000,
        run_timeout: Duration::from_secs(30),
        dry_run: false,
    }
}

#[tokio::test]
async fn test_double_promotion_with_no_new_rows_is_idempotent() {
    let staging = Arc::new(MemoryStore::new());
    let historical = Arc::new(MemoryStore::new());

    let batch = classified_batch(&[
        raw("amoxicillin", "2025-06-01", "Product on backorder"),
        raw("heparin", "2025-06-02", "Available"),
    ]);
    staging.upsert(&batch).await.unwrap();

    let coordinator = EtlCoordinator::new(
        staging.clone(),
        historical.clone(),
        Arc::new(ScriptedFetcher::empty()),
        Classifier::keyword_only(),
        options(),
    );

    let first = coordinator.run().await.unwrap();
    assert_eq!(first.promoted, 2);
    assert_eq!(first.counts_after.historical, 2);
    assert_eq!(first.counts_after.staging, 0);

    let second = coordinator.run().await.unwrap();
    assert_eq!(second.promoted, 0);
    assert_eq!(second.counts_after.historical, 2);
    assert_eq!(second.counts_after.staging, 0);
}

#[tokio::test]
async fn test_deferred_staging_clear_does_not_duplicate_history_on_retry() {
    let staging = Arc::new(FaultyStore::new());
    let historical = Arc::new(MemoryStore::new());

    let batch = classified_batch(&[
        raw("amoxicillin", "2025-06-01", "Product on backorder"),
        raw("heparin", "2025-06-02", "Available"),
        raw("lidocaine", "2025-06-03", "Limited supply"),
    ]);
    staging.upsert(&batch).await.unwrap();

    let coordinator = EtlCoordinator::new(
        staging.clone(),
        historical.clone(),
        Arc::new(ScriptedFetcher::empty()),
        Classifier::keyword_only(),
        options(),
    );

    // First run: historical upsert succeeds, staging clear fails
    staging.set_fail_delete(true);
    let first = coordinator.run().await.unwrap();
    assert!(first.staging_clear_deferred);
    assert_eq!(first.counts_after.historical, 3);
    // The un-cleared rows are still in staging
    assert_eq!(first.counts_after.staging, 3);

    // Retry with the fault healed: the same rows are re-promoted
    staging.set_fail_delete(false);
    let second = coordinator.run().await.unwrap();
    assert!(!second.staging_clear_deferred);
    assert_eq!(second.promoted, 3);

    // No duplicates: historical count equals the count after the first upsert
    assert_eq!(second.counts_after.historical, 3);
    assert_eq!(second.counts_after.staging, 0);
}

#[tokio::test]
async fn test_historical_upsert_failure_leaves_staging_untouched() {
    let staging = Arc::new(MemoryStore::new());
    let historical = Arc::new(FaultyStore::new());
    historical.set_fail_upsert(true);

    let batch = classified_batch(&[raw("amoxicillin", "2025-06-01", "Available")]);
    staging.upsert(&batch).await.unwrap();

    let coordinator = EtlCoordinator::new(
        staging.clone(),
        historical.clone(),
        Arc::new(ScriptedFetcher::empty()),
        Classifier::keyword_only(),
        options(),
    );

    let err = coordinator.run().await.unwrap_err();
    assert!(matches!(err, ShortfallError::Persistence(_)));

    // The failed run marked nothing: staging keeps its rows for retry
    assert_eq!(staging.count().await.unwrap(), 1);
    assert_eq!(historical.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_fetch_failure_keeps_committed_promotion() {
    let staging = Arc::new(MemoryStore::new());
    let historical = Arc::new(MemoryStore::new());

    let batch = classified_batch(&[raw("amoxicillin", "2025-06-01", "Available")]);
    staging.upsert(&batch).await.unwrap();

    let coordinator = EtlCoordinator::new(
        staging.clone(),
        historical.clone(),
        Arc::new(FailingFetcher),
        Classifier::keyword_only(),
        options(),
    );

    let err = coordinator.run().await.unwrap_err();
    assert!(matches!(err, ShortfallError::Fetch(_)));

    // Promotion happened before the fetch and stays committed
    assert_eq!(historical.count().await.unwrap(), 1);
    assert_eq!(staging.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_refetched_window_creates_no_duplicate_history() {
    let staging = Arc::new(MemoryStore::new());
    let historical = Arc::new(MemoryStore::new());

    // The same report appears in two consecutive fetch windows
    let report = raw("amoxicillin", "2025-06-01", "Product on backorder");
    let fetcher = ScriptedFetcher::new(vec![vec![report.clone()], vec![report.clone()]]);

    let coordinator = EtlCoordinator::new(
        staging.clone(),
        historical.clone(),
        Arc::new(fetcher),
        Classifier::keyword_only(),
        options(),
    );

    coordinator.run().await.unwrap();
    let second = coordinator.run().await.unwrap();

    // One promoted row, and the re-fetched record reuses its id in staging
    assert_eq!(second.counts_after.historical, 1);
    assert_eq!(second.counts_after.staging, 1);

    let historical_ids: Vec<u64> = historical
        .select_all()
        .await
        .unwrap()
        .iter()
        .map(|r| r.id)
        .collect();
    let staging_ids: Vec<u64> = staging
        .select_all()
        .await
        .unwrap()
        .iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(historical_ids, staging_ids);

    // A third run promotes the identical row onto itself: still one row
    let third = coordinator.run().await.unwrap();
    assert_eq!(third.counts_after.historical, 1);
}

#[tokio::test]
async fn test_overlapping_invocations_fail_fast() {
    use tokio::sync::Notify;

    struct BlockingFetcher {
        entered: Arc<Notify>,
        release: Arc<Notify>,
    }

    #[async_trait]
    impl ShortageFetcher for BlockingFetcher {
        async fn fetch(
            &self,
            _start_date: NaiveDate,
            _end_date: NaiveDate,
            _limit: usize,
        ) -> Result<Vec<RawUpdateRecord>> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(vec![])
        }
    }

    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());

    let coordinator = Arc::new(EtlCoordinator::new(
        Arc::new(MemoryStore::new()),
        Arc::new(MemoryStore::new()),
        Arc::new(BlockingFetcher {
            entered: entered.clone(),
            release: release.clone(),
        }),
        Classifier::keyword_only(),
        options(),
    ));

    let background = {
        let coordinator = coordinator.clone();
        tokio::spawn(async move { coordinator.run().await })
    };

    // Wait until the first run is parked inside the fetch stage
    entered.notified().await;

    let err = coordinator.run().await.unwrap_err();
    assert!(matches!(err, ShortfallError::Etl(_)));

    release.notify_one();
    background.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_full_cycle_classifies_and_promotes() {
    let staging = Arc::new(MemoryStore::new());
    let historical = Arc::new(MemoryStore::new());

    let fetcher = ScriptedFetcher::new(vec![
        vec![
            raw("amoxicillin", "2025-06-01", "Product discontinued"),
            raw("heparin", "2025-06-02", "Supply disruption ongoing"),
        ],
        vec![raw("heparin", "2025-06-10", "Available")],
    ]);

    let coordinator = EtlCoordinator::new(
        staging.clone(),
        historical.clone(),
        Arc::new(fetcher),
        Classifier::keyword_only(),
        options(),
    );

    coordinator.run().await.unwrap();
    let second = coordinator.run().await.unwrap();

    assert_eq!(second.promoted, 2);
    assert_eq!(second.counts_after.historical, 2);
    assert_eq!(second.counts_after.staging, 1);

    let promoted = historical.select_all().await.unwrap();
    let amoxicillin = promoted
        .iter()
        .find(|r| r.generic_name() == "amoxicillin")
        .unwrap();
    assert_eq!(
        amoxicillin.availability_status,
        AvailabilityStatus::Discontinued
    );
    let heparin = promoted
        .iter()
        .find(|r| r.generic_name() == "heparin")
        .unwrap();
    assert_eq!(heparin.availability_status, AvailabilityStatus::NotAvailable);
}
