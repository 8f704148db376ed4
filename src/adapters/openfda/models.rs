//! OpenFDA wire models
//!
//! Deserialization targets for the drug shortages endpoint payload, plus the
//! conversion into the domain's [`RawUpdateRecord`]. The upstream payload is
//! loosely shaped: most fields may be absent, therapeutic_category arrives
//! as an array, and dates come as strings.

use crate::domain::{RawUpdateRecord, Result, ShortfallError};
use chrono::NaiveDate;
use serde::Deserialize;

/// Top-level response envelope of the shortages endpoint
#[derive(Debug, Deserialize)]
pub struct ShortageResponse {
    /// Matching report entries; absent when the query matched nothing
    #[serde(default)]
    pub results: Vec<ShortageResult>,
}

/// One shortage report entry as returned by the API
#[derive(Debug, Clone, Deserialize)]
pub struct ShortageResult {
    #[serde(default)]
    pub generic_name: String,

    #[serde(default)]
    pub company_name: String,

    #[serde(default)]
    pub presentation: String,

    #[serde(default)]
    pub update_type: String,

    pub update_date: String,

    #[serde(default)]
    pub availability: String,

    #[serde(default)]
    pub related_info: String,

    #[serde(default)]
    pub resolved_note: Option<String>,

    #[serde(default)]
    pub reason_for_shortage: Option<String>,

    /// The source reports zero or more categories; the first is kept
    #[serde(default)]
    pub therapeutic_category: Vec<String>,

    #[serde(default)]
    pub status: String,

    #[serde(default)]
    pub change_date: Option<String>,

    #[serde(default)]
    pub date_discontinued: Option<String>,

    #[serde(default)]
    pub package_ndc: String,
}

impl ShortageResult {
    /// Converts the wire entry into a domain record
    ///
    /// # Errors
    ///
    /// Returns a `Parse` error if a date field cannot be parsed.
    pub fn into_record(self) -> Result<RawUpdateRecord> {
        let update_date = parse_date(&self.update_date)?;
        let change_date = self.change_date.as_deref().map(parse_date).transpose()?;
        let date_discontinued = self
            .date_discontinued
            .as_deref()
            .map(parse_date)
            .transpose()?;

        Ok(RawUpdateRecord {
            generic_name: self.generic_name,
            company_name: self.company_name,
            presentation: self.presentation,
            update_type: self.update_type,
            update_date,
            availability: self.availability,
            related_info: self.related_info,
            resolved_note: self.resolved_note,
            reason_for_shortage: self.reason_for_shortage,
            therapeutic_category: self
                .therapeutic_category
                .into_iter()
                .next()
                .unwrap_or_default(),
            status: self.status,
            change_date,
            date_discontinued,
            ndc: self.package_ndc,
        })
    }
}

/// Parses the date formats the endpoint is known to emit
fn parse_date(text: &str) -> Result<NaiveDate> {
    let trimmed = text.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%Y%m%d"))
        .map_err(|e| ShortfallError::Parse(format!("Invalid date '{trimmed}': {e}")))
}
