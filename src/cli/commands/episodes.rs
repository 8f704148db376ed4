//! Episodes command implementation
//!
//! This module implements the `episodes` command: materialize availability
//! episodes (or the shortage rankings derived from them) from the current
//! store contents and print them as JSON for downstream consumers.

use crate::adapters::store::create_stores;
use crate::config::load_config;
use crate::core::episodes::{build_episodes, rank_by_shortage};
use clap::Args;

/// Arguments for the episodes command
#[derive(Args, Debug)]
pub struct EpisodesArgs {
    /// Print shortage rankings instead of raw episodes
    #[arg(long)]
    pub rankings: bool,

    /// Exclude unpromoted staging rows (overrides the config setting)
    #[arg(long)]
    pub historical_only: bool,
}

impl EpisodesArgs {
    /// Execute the episodes command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Materializing episodes");

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load configuration: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        let stores = match create_stores(&config) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Failed to connect to the stores: {e}");
                return Ok(4); // Connection error exit code
            }
        };

        let mut records = match stores.historical.select_all().await {
            Ok(r) => r,
            Err(e) => {
                eprintln!("Failed to read historical records: {e}");
                return Ok(5); // Fatal error exit code
            }
        };

        let include_staging =
            config.etl.include_staging_in_episodes && !self.historical_only;
        if include_staging {
            match stores.staging.select_all().await {
                Ok(staged) => records.extend(staged),
                Err(e) => {
                    eprintln!("Failed to read staging records: {e}");
                    return Ok(5);
                }
            }
        }

        let episodes = build_episodes(&records);
        tracing::info!(
            records = records.len(),
            episodes = episodes.len(),
            include_staging = include_staging,
            "Episodes materialized"
        );

        let json = if self.rankings {
            serde_json::to_string_pretty(&rank_by_shortage(&episodes))?
        } else {
            serde_json::to_string_pretty(&episodes)?
        };

        println!("{json}");
        Ok(0)
    }
}
