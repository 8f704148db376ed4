//! Shortage record domain models
//!
//! This module defines the two record shapes that flow through the pipeline:
//! the raw update record as received from the upstream reporting API, and the
//! classified record that carries a stable identifier and a canonical
//! availability status.

use super::status::AvailabilityStatus;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A single shortage status update as reported upstream
///
/// Produced by the fetch collaborator; immutable once received. The five
/// identity fields (generic_name, company_name, presentation, update_date,
/// ndc) determine the record's stable id, see [`crate::core::ident`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawUpdateRecord {
    /// Generic (non-proprietary) drug name
    pub generic_name: String,

    /// Reporting company
    pub company_name: String,

    /// Dosage form / strength presentation
    pub presentation: String,

    /// Kind of update this report represents (e.g. "New", "Revised")
    pub update_type: String,

    /// Date the report was updated upstream
    pub update_date: NaiveDate,

    /// Free-text availability field
    pub availability: String,

    /// Free-text supplementary information
    pub related_info: String,

    /// Resolution note, present once a shortage is resolved
    pub resolved_note: Option<String>,

    /// Stated reason for the shortage
    pub reason_for_shortage: Option<String>,

    /// Therapeutic category (first category when the source reports several)
    pub therapeutic_category: String,

    /// Free-text shortage status field
    pub status: String,

    /// Date the status last changed
    pub change_date: Option<NaiveDate>,

    /// Date the product was discontinued, if it was
    pub date_discontinued: Option<NaiveDate>,

    /// Package-level national drug code
    pub ndc: String,
}

/// A raw record after classification and id assignment
///
/// Created once per raw record per run; never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedRecord {
    /// Stable content-derived identifier (48-bit value, fits a BIGINT)
    pub id: u64,

    /// The raw record this classification was derived from
    #[serde(flatten)]
    pub raw: RawUpdateRecord,

    /// Canonical availability status assigned by the classifier
    pub availability_status: AvailabilityStatus,

    /// When this classified record was created
    pub created_at: DateTime<Utc>,
}

impl ClassifiedRecord {
    /// Creates a classified record from its parts
    pub fn new(
        id: u64,
        raw: RawUpdateRecord,
        availability_status: AvailabilityStatus,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            raw,
            availability_status,
            created_at,
        }
    }

    /// Generic drug name this record reports on
    pub fn generic_name(&self) -> &str {
        &self.raw.generic_name
    }

    /// Date of the underlying status snapshot
    pub fn update_date(&self) -> NaiveDate {
        self.raw.update_date
    }
}
