//! Episode reconstruction from point-in-time snapshots
//!
//! Converts the time-ordered status snapshots of each drug into
//! non-overlapping, contiguous availability episodes, plus the shortage
//! rankings derived from them. Episodes are recomputed on demand from the
//! current store contents and are never persisted as a source of truth.

use crate::domain::{ClassifiedRecord, Episode};
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Builds episodes from classified records, ending open episodes at today
///
/// Convenience wrapper over [`build_episodes_at`] using the wall clock.
pub fn build_episodes(records: &[ClassifiedRecord]) -> Vec<Episode> {
    build_episodes_at(records, Utc::now().date_naive())
}

/// Builds episodes from classified records with an explicit "now"
///
/// For each distinct generic name, records are sorted by update date
/// (stable - ties keep their original order) and each record opens an
/// episode lasting until the next strictly later update date, or until
/// `now` for the last record. Records sharing an update date collapse to a
/// single boundary point: only the last such record in stable order defines
/// the episode starting there, so no zero-length episodes are produced.
///
/// Output is ordered by generic name, then chronologically.
pub fn build_episodes_at(records: &[ClassifiedRecord], now: NaiveDate) -> Vec<Episode> {
    let mut by_drug: BTreeMap<&str, Vec<&ClassifiedRecord>> = BTreeMap::new();
    for record in records {
        by_drug.entry(record.generic_name()).or_default().push(record);
    }

    let mut episodes = Vec::new();
    for (_, mut drug_records) in by_drug {
        drug_records.sort_by_key(|r| r.update_date());

        // Collapse records sharing an update date onto the last one in
        // stable order - it alone defines the boundary at that date.
        let mut boundaries: Vec<&ClassifiedRecord> = Vec::new();
        for record in drug_records {
            let same_date = boundaries
                .last()
                .is_some_and(|last| last.update_date() == record.update_date());
            if same_date {
                let i = boundaries.len() - 1;
                boundaries[i] = record;
            } else {
                boundaries.push(record);
            }
        }

        for (i, record) in boundaries.iter().enumerate() {
            let start = record.update_date();
            let end = boundaries
                .get(i + 1)
                .map(|next| next.update_date())
                .unwrap_or(now);

            episodes.push(Episode {
                generic_name: record.raw.generic_name.clone(),
                company_name: record.raw.company_name.clone(),
                therapeutic_category: record.raw.therapeutic_category.clone(),
                availability_status: record.availability_status,
                episode_start_date: start,
                episode_end_date: end,
                duration_days: (end - start).num_days(),
            });
        }
    }

    episodes
}

/// Aggregated shortage ranking for one drug/company/category grouping
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrugRanking {
    /// Generic drug name
    pub generic_name: String,

    /// Reporting company
    pub company_name: String,

    /// Therapeutic category
    pub therapeutic_category: String,

    /// Total episode days observed for this grouping
    pub total_days: i64,

    /// Number of episodes observed
    pub total_episodes: usize,

    /// Days spent in a shortage status
    pub shortage_days: i64,

    /// Share of observed time spent in shortage, as a percentage
    pub shortage_pct: f64,
}

/// Ranks drug/company/category groupings by time spent in shortage
///
/// Shortage time is the total duration of episodes whose status counts as a
/// shortage (not available or limited availability). Output is sorted by
/// shortage days descending, then by name for a stable order.
pub fn rank_by_shortage(episodes: &[Episode]) -> Vec<DrugRanking> {
    let mut grouped: BTreeMap<(&str, &str, &str), (i64, usize, i64)> = BTreeMap::new();
    for episode in episodes {
        let entry = grouped
            .entry((
                &episode.generic_name,
                &episode.company_name,
                &episode.therapeutic_category,
            ))
            .or_default();
        entry.0 += episode.duration_days;
        entry.1 += 1;
        if episode.is_shortage() {
            entry.2 += episode.duration_days;
        }
    }

    let mut rankings: Vec<DrugRanking> = grouped
        .into_iter()
        .map(|((name, company, category), (total_days, total_episodes, shortage_days))| {
            let shortage_pct = if total_days > 0 {
                (shortage_days as f64 / total_days as f64 * 10_000.0).round() / 100.0
            } else {
                0.0
            };
            DrugRanking {
                generic_name: name.to_string(),
                company_name: company.to_string(),
                therapeutic_category: category.to_string(),
                total_days,
                total_episodes,
                shortage_days,
                shortage_pct,
            }
        })
        .collect();

    rankings.sort_by(|a, b| {
        b.shortage_days
            .cmp(&a.shortage_days)
            .then_with(|| a.generic_name.cmp(&b.generic_name))
    });

    rankings
}
