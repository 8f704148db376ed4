//! Core pipeline logic
//!
//! Business logic of the reconciliation engine: classification, record
//! identification, episode reconstruction, and the promotion/reload
//! orchestration.

pub mod classify;
pub mod episodes;
pub mod etl;
pub mod ident;
