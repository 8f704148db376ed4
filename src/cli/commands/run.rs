//! Run command implementation
//!
//! This module implements the `run` command: one complete ETL cycle. The
//! command is idempotent and designed to be invoked by an external scheduler;
//! any failure maps to a non-zero exit code for scheduler-level alerting.

use crate::config::load_config;
use crate::core::etl::EtlCoordinator;
use clap::Args;

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Dry run mode - simulate the run without writing to the stores
    #[arg(long)]
    pub dry_run: bool,

    /// Override the trailing fetch window in days
    #[arg(long)]
    pub days_back: Option<i64>,
}

impl RunArgs {
    /// Execute the run command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Starting run command");

        // Load configuration
        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        // Apply CLI overrides
        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }

        if let Some(days_back) = self.days_back {
            tracing::info!(days_back = days_back, "Overriding fetch window from CLI");
            config.openfda.days_back = days_back;
        }

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2);
        }

        if config.application.dry_run {
            println!("🔍 DRY RUN MODE - No data will be written to the stores");
            println!();
        }

        // Create coordinator
        tracing::info!("Creating ETL coordinator");
        let coordinator = match EtlCoordinator::from_config(&config).await {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create ETL coordinator");
                eprintln!("Failed to initialize ETL: {e}");
                return Ok(4); // Connection error exit code
            }
        };

        println!("🚀 Starting ETL run...");
        println!();

        let summary = match coordinator.run().await {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "ETL run failed");
                eprintln!("ETL run failed: {e}");
                return Ok(1); // Run failure exit code
            }
        };

        // Display summary
        println!("📊 Run Summary:");
        println!(
            "  Staging:    {} -> {}",
            summary.counts_before.staging, summary.counts_after.staging
        );
        println!(
            "  Historical: {} -> {}",
            summary.counts_before.historical, summary.counts_after.historical
        );
        println!("  Promoted:   {}", summary.promoted);
        println!("  Fetched:    {}", summary.fetched);
        println!("  Staged:     {}", summary.staged);
        println!("  Duration:   {:.2}s", summary.duration.as_secs_f64());
        println!();

        if summary.staging_clear_deferred {
            println!("⚠️  Staging clear was deferred; the next run will re-promote the same rows.");
            println!();
        }

        println!("✅ ETL run completed successfully!");
        Ok(0)
    }
}
