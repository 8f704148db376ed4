//! ETL orchestration
//!
//! The coordinator drives the promotion/reload cycle; the summary reports
//! what one run did.

pub mod coordinator;
pub mod summary;

pub use coordinator::{EtlCoordinator, EtlOptions};
pub use summary::{RunSummary, StoreCounts};
