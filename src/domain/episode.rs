//! Availability episode model
//!
//! An episode is a contiguous time interval during which a drug held one
//! classified availability status. Episodes are derived from the historical
//! record on demand and are never themselves a source of truth.

use super::status::AvailabilityStatus;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A contiguous availability interval for one drug
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    /// Generic drug name
    pub generic_name: String,

    /// Reporting company
    pub company_name: String,

    /// Therapeutic category
    pub therapeutic_category: String,

    /// Status held throughout this episode
    pub availability_status: AvailabilityStatus,

    /// First day of the episode (inclusive)
    pub episode_start_date: NaiveDate,

    /// Day the next episode begins, or "now" for the open-ended final episode
    pub episode_end_date: NaiveDate,

    /// Whole days between start and end
    pub duration_days: i64,
}

impl Episode {
    /// Whether this episode represents time in shortage
    pub fn is_shortage(&self) -> bool {
        self.availability_status.is_shortage()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_episode_is_shortage_follows_status() {
        let episode = Episode {
            generic_name: "amoxicillin".to_string(),
            company_name: "Acme Pharma".to_string(),
            therapeutic_category: "Anti-Infective".to_string(),
            availability_status: AvailabilityStatus::NotAvailable,
            episode_start_date: "2025-01-01".parse().unwrap(),
            episode_end_date: "2025-01-15".parse().unwrap(),
            duration_days: 14,
        };

        assert!(episode.is_shortage());
    }
}
