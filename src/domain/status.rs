//! Canonical availability status
//!
//! The classifier maps free-text availability fields into this small closed
//! set. The serde representation uses the canonical lowercase phrases that
//! downstream consumers (episode tables, dashboards) expect.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical availability status for a drug shortage record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AvailabilityStatus {
    /// Product is available
    #[serde(rename = "available")]
    Available,

    /// Product is available but constrained (allocated, intermittent, ...)
    #[serde(rename = "limited availability")]
    LimitedAvailability,

    /// Product is in shortage / not obtainable
    #[serde(rename = "not available")]
    NotAvailable,

    /// Product has been discontinued
    #[serde(rename = "discontinued")]
    Discontinued,

    /// Free text did not match any rule
    #[serde(rename = "unclear")]
    Unclear,
}

impl AvailabilityStatus {
    /// Returns the canonical lowercase phrase for this status
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::LimitedAvailability => "limited availability",
            Self::NotAvailable => "not available",
            Self::Discontinued => "discontinued",
            Self::Unclear => "unclear",
        }
    }

    /// Whether this status counts as a shortage for ranking purposes
    pub fn is_shortage(&self) -> bool {
        matches!(self, Self::NotAvailable | Self::LimitedAvailability)
    }
}

impl fmt::Display for AvailabilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AvailabilityStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "available" => Ok(Self::Available),
            "limited availability" => Ok(Self::LimitedAvailability),
            "not available" => Ok(Self::NotAvailable),
            "discontinued" => Ok(Self::Discontinued),
            "unclear" => Ok(Self::Unclear),
            other => Err(format!(
                "Unknown availability status '{other}'. Expected one of: \
                 available, limited availability, not available, discontinued, unclear"
            )),
        }
    }
}
