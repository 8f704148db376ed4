//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Shortfall using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Shortfall - Drug Shortage ETL Tool
#[derive(Parser, Debug)]
#[command(name = "shortfall")]
#[command(version, about, long_about = None)]
#[command(author = "Shortfall Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "shortfall.toml", env = "SHORTFALL_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "SHORTFALL_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one ETL cycle: promote staging, fetch, classify, reload staging
    Run(commands::run::RunArgs),

    /// Materialize availability episodes (and rankings) as JSON
    Episodes(commands::episodes::EpisodesArgs),

    /// Show row counts for the staging and historical stores
    Status(commands::status::StatusArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
