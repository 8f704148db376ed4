//! Validate-config command implementation
//!
//! This module implements the `validate-config` command for checking a
//! configuration file without running anything.

use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration: {config_path}");
        println!();

        match load_config(config_path) {
            Ok(config) => {
                println!("✅ Configuration is valid");
                println!();
                println!("  Store target:  {:?}", config.store_target);
                println!("  Fetch window:  {} days", config.openfda.days_back);
                println!("  Fetch limit:   {}", config.openfda.limit);
                println!("  Endpoint:      {}", config.openfda.base_url);
                if let Some(path) = &config.classifier.overrides_path {
                    println!("  Overrides:     {path}");
                }
                Ok(0)
            }
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                Ok(2) // Configuration error exit code
            }
        }
    }
}
