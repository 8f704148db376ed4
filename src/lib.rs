// Shortfall - Drug Shortage ETL Tool
// Copyright (c) 2025 Shortfall Contributors
// Licensed under the MIT License

//! # Shortfall - Drug Shortage Reconciliation ETL
//!
//! Shortfall is an ETL tool built in Rust that ingests periodic drug shortage
//! status reports from the OpenFDA API and reconciles them into a
//! deduplicated, classified historical record plus derived availability
//! episodes for downstream analytics.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Fetching** shortage reports for a trailing date window
//! - **Classifying** free-text availability fields into a canonical status set
//! - **Identifying** records with deterministic content-hash ids
//! - **Promoting** staged batches into the historical ledger idempotently
//! - **Reconstructing** availability episodes from point-in-time snapshots
//!
//! ## Architecture
//!
//! Shortfall follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (classify, ident, episodes, etl)
//! - [`adapters`] - External integrations (OpenFDA, stores, overrides)
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use shortfall::config::load_config;
//! use shortfall::core::etl::EtlCoordinator;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Load configuration
//!     let config = load_config("shortfall.toml")?;
//!
//!     // Create the coordinator and execute one run
//!     let coordinator = EtlCoordinator::from_config(&config).await?;
//!     let summary = coordinator.run().await?;
//!
//!     println!(
//!         "Promoted {} rows, staged {} new records",
//!         summary.promoted, summary.staged
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Idempotent Promotion
//!
//! Record ids are derived from content (see [`core::ident`]), and both stores
//! upsert by id, so re-fetching overlapping windows or re-promoting a batch
//! after a partial failure never duplicates history. Staging is cleared only
//! strictly after a confirmed historical upsert; a failed clear is a delayed
//! cleanup, not data loss.
//!
//! ## Episodes
//!
//! Episodes are recomputed on demand from the stores:
//!
//! ```rust
//! use shortfall::core::episodes::build_episodes;
//!
//! let records = vec![];
//! let episodes = build_episodes(&records);
//! assert!(episodes.is_empty());
//! ```
//!
//! ## Error Handling
//!
//! Shortfall uses the [`domain::ShortfallError`] type for all errors:
//!
//! ```rust,no_run
//! use shortfall::domain::ShortfallError;
//!
//! fn example() -> Result<(), ShortfallError> {
//!     // Errors are automatically converted using the ? operator
//!     let config = shortfall::config::load_config("shortfall.toml")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Logging
//!
//! Shortfall uses structured logging with the `tracing` crate:
//!
//! ```rust,no_run
//! use tracing::{info, warn};
//!
//! info!("Starting ETL run");
//! warn!(count = 0, "No new reports in the fetch window");
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
