//! Status command implementation
//!
//! This module implements the `status` command for displaying the current
//! row counts of the staging and historical stores.

use crate::adapters::store::create_stores;
use crate::config::load_config;
use clap::Args;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Checking store status");

        println!("📊 Store Status");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {}", e);
                return Ok(2); // Configuration error exit code
            }
        };

        let stores = match create_stores(&config) {
            Ok(s) => s,
            Err(e) => {
                println!("❌ Failed to connect to the stores");
                println!("   Error: {}", e);
                return Ok(4); // Connection error exit code
            }
        };

        let staging = match stores.staging.count().await {
            Ok(n) => n,
            Err(e) => {
                println!("❌ Failed to count staging rows");
                println!("   Error: {}", e);
                return Ok(5); // Fatal error exit code
            }
        };
        let historical = match stores.historical.count().await {
            Ok(n) => n,
            Err(e) => {
                println!("❌ Failed to count historical rows");
                println!("   Error: {}", e);
                return Ok(5);
            }
        };

        println!("  Staging rows:    {staging}");
        println!("  Historical rows: {historical}");
        println!();

        if staging > 0 {
            println!("The next run will promote {staging} staging row(s) into historical.");
        } else {
            println!("Staging is empty; the next run will start with a fresh fetch.");
        }

        Ok(0)
    }
}
