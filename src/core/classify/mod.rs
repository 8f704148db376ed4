//! Free-text availability classification
//!
//! The classifier maps the three free-text fields of an update record
//! (availability, related info, status) onto the canonical
//! [`AvailabilityStatus`] set. Classification is rule-based and
//! deterministic: an exact-match override table is consulted first, then
//! keyword categories are tested in a fixed, configurable precedence order.
//!
//! The classifier is a pure function over its inputs - no side effects, safe
//! to call repeatedly and concurrently, total (it always returns a status,
//! defaulting to [`AvailabilityStatus::Unclear`]).

use crate::domain::AvailabilityStatus;
use std::collections::HashMap;

/// Keyword category tested against the concatenated free-text fields
///
/// Each category owns a fixed substring list and maps to one canonical
/// status. Categories are tested in the order given by
/// [`KeywordPrecedence`]; the first category with a matching substring wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordCategory {
    /// Product discontinuation language
    Discontinued,
    /// Outage / shortage / supply-disruption language
    NotAvailable,
    /// Constrained-supply language (allocation, intermittent release)
    LimitedAvailability,
    /// Positive availability language
    Available,
}

impl KeywordCategory {
    /// Canonical status this category classifies to
    pub fn status(&self) -> AvailabilityStatus {
        match self {
            Self::Discontinued => AvailabilityStatus::Discontinued,
            Self::NotAvailable => AvailabilityStatus::NotAvailable,
            Self::LimitedAvailability => AvailabilityStatus::LimitedAvailability,
            Self::Available => AvailabilityStatus::Available,
        }
    }

    /// Substrings that trigger this category (matched against lowercased text)
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Self::Discontinued => &["discontinue", "discontinued"],
            Self::NotAvailable => &[
                "not available",
                "unavailable",
                "out of stock",
                "shortage",
                "backorder",
                "back order",
                "supply disruption",
                "manufacturing delay",
                "resupply tbd",
                "expected release",
                "next delivery",
                "estimated availability",
            ],
            Self::LimitedAvailability => &[
                "limited",
                "intermittent",
                "restricted",
                "allocated",
                "allocation",
                "allocating",
                "temporary shortage",
                "reduced supply",
                "under allocation",
            ],
            Self::Available => &[
                "available",
                "in stock",
                "supply available",
                "shipping",
                "product available",
            ],
        }
    }
}

/// Explicit, named keyword-category precedence
///
/// The order in which categories are tested is a classification decision in
/// its own right ("manufacturing delay" text often also contains "limited"),
/// so it is carried as configuration rather than hard-coded into the match
/// logic. The default tests outage language before constrained-supply
/// language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordPrecedence(Vec<KeywordCategory>);

impl KeywordPrecedence {
    /// Builds a precedence from an ordered list of canonical status phrases
    ///
    /// # Errors
    ///
    /// Returns an error if the list is not a permutation of the four keyword
    /// categories ("discontinued", "not available", "limited availability",
    /// "available").
    pub fn from_phrases(phrases: &[String]) -> Result<Self, String> {
        let mut categories = Vec::with_capacity(phrases.len());
        for phrase in phrases {
            let category = match phrase.trim().to_lowercase().as_str() {
                "discontinued" => KeywordCategory::Discontinued,
                "not available" => KeywordCategory::NotAvailable,
                "limited availability" => KeywordCategory::LimitedAvailability,
                "available" => KeywordCategory::Available,
                other => {
                    return Err(format!(
                        "Unknown keyword category '{other}'. Expected one of: \
                         discontinued, not available, limited availability, available"
                    ))
                }
            };
            if categories.contains(&category) {
                return Err(format!("Duplicate keyword category '{phrase}'"));
            }
            categories.push(category);
        }
        if categories.len() != 4 {
            return Err(format!(
                "Keyword precedence must list all 4 categories, got {}",
                categories.len()
            ));
        }
        Ok(Self(categories))
    }

    /// Categories in test order
    pub fn categories(&self) -> &[KeywordCategory] {
        &self.0
    }
}

impl Default for KeywordPrecedence {
    fn default() -> Self {
        Self(vec![
            KeywordCategory::Discontinued,
            KeywordCategory::NotAvailable,
            KeywordCategory::LimitedAvailability,
            KeywordCategory::Available,
        ])
    }
}

/// Rule-based availability classifier
///
/// Holds the curated override table (loaded once at startup from the
/// reference collaborator, possibly empty) and the keyword precedence.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    overrides: HashMap<String, AvailabilityStatus>,
    precedence: KeywordPrecedence,
}

impl Classifier {
    /// Creates a classifier with the given overrides and precedence
    pub fn new(
        overrides: HashMap<String, AvailabilityStatus>,
        precedence: KeywordPrecedence,
    ) -> Self {
        Self {
            overrides,
            precedence,
        }
    }

    /// Creates a keyword-only classifier with the default precedence
    pub fn keyword_only() -> Self {
        Self::default()
    }

    /// Number of loaded override entries
    pub fn override_count(&self) -> usize {
        self.overrides.len()
    }

    /// Classifies the free-text fields of an update record
    ///
    /// Resolution order:
    /// 1. The trimmed availability text is looked up verbatim in the
    ///    override table; a hit bypasses keyword rules entirely.
    /// 2. All three fields are concatenated, lowercased, and tested against
    ///    the keyword categories in precedence order; first match wins.
    /// 3. No match yields [`AvailabilityStatus::Unclear`].
    pub fn classify(
        &self,
        availability_text: &str,
        related_info: &str,
        status_text: &str,
    ) -> AvailabilityStatus {
        if let Some(status) = self.overrides.get(availability_text.trim()) {
            return *status;
        }

        let haystack =
            format!("{availability_text} {related_info} {status_text}").to_lowercase();

        for category in self.precedence.categories() {
            if category
                .keywords()
                .iter()
                .any(|keyword| haystack.contains(keyword))
            {
                return category.status();
            }
        }

        AvailabilityStatus::Unclear
    }
}
