//! File-backed reference overrides
//!
//! Loads the curated (availability text -> status) override mapping from a
//! TOML file. Deployments that maintain the overrides next to the config
//! file use this instead of the database table.
//!
//! Expected shape:
//!
//! ```toml
//! [overrides]
//! "Fully allocated" = "not available"
//! "Product available from wholesaler" = "available"
//! ```

use crate::adapters::store::traits::OverrideSource;
use crate::domain::{AvailabilityStatus, Result, ShortfallError};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Deserialize)]
struct OverridesFile {
    #[serde(default)]
    overrides: HashMap<String, String>,
}

/// Override source reading a TOML file at load time
pub struct FileOverrides {
    path: PathBuf,
}

impl FileOverrides {
    /// Creates a source for the given file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl OverrideSource for FileOverrides {
    async fn load_overrides(&self) -> Result<HashMap<String, AvailabilityStatus>> {
        let contents = std::fs::read_to_string(&self.path).map_err(|e| {
            ShortfallError::Configuration(format!(
                "Failed to read overrides file {}: {e}",
                self.path.display()
            ))
        })?;

        let parsed: OverridesFile = toml::from_str(&contents)?;

        let mut overrides = HashMap::with_capacity(parsed.overrides.len());
        for (text, status_text) in parsed.overrides {
            match AvailabilityStatus::from_str(&status_text) {
                Ok(status) => {
                    overrides.insert(text, status);
                }
                Err(e) => {
                    tracing::warn!(
                        availability_text = %text,
                        error = %e,
                        "Skipping override entry with unknown status"
                    );
                }
            }
        }

        tracing::info!(
            path = %self.path.display(),
            count = overrides.len(),
            "Loaded availability overrides"
        );
        Ok(overrides)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_load_overrides_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[overrides]
"Fully allocated" = "not available"
"See supplier note" = "unclear"
"#
        )
        .unwrap();
        file.flush().unwrap();

        let source = FileOverrides::new(file.path());
        let overrides = source.load_overrides().await.unwrap();

        assert_eq!(overrides.len(), 2);
        assert_eq!(
            overrides["Fully allocated"],
            AvailabilityStatus::NotAvailable
        );
        assert_eq!(overrides["See supplier note"], AvailabilityStatus::Unclear);
    }

    #[tokio::test]
    async fn test_unknown_status_entries_are_skipped() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[overrides]
"Fully allocated" = "not available"
"Something odd" = "perhaps"
"#
        )
        .unwrap();
        file.flush().unwrap();

        let overrides = FileOverrides::new(file.path())
            .load_overrides()
            .await
            .unwrap();

        assert_eq!(overrides.len(), 1);
        assert!(!overrides.contains_key("Something odd"));
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let result = FileOverrides::new("/nonexistent/overrides.toml")
            .load_overrides()
            .await;
        assert!(result.is_err());
    }
}
