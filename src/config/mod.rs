//! Configuration management for Shortfall.
//!
//! TOML-based configuration loading, parsing, and validation with support
//! for environment variable substitution (`${VAR_NAME}`) and `SHORTFALL_*`
//! overrides.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use shortfall::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("shortfall.toml")?;
//! println!("Fetch window: {} days", config.openfda.days_back);
//! # Ok(())
//! # }
//! ```
//!
//! # Example Configuration
//!
//! ```toml
//! store_target = "postgres"
//!
//! [application]
//! log_level = "info"
//!
//! [openfda]
//! days_back = 15
//! limit = 1000
//!
//! [postgres]
//! connection_string = "${SHORTFALL_DATABASE_URL}"
//!
//! [classifier]
//! overrides_path = "overrides.toml"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::load_config;
pub use schema::{
    ApplicationConfig, ClassifierConfig, EtlConfig, LoggingConfig, OpenFdaConfig,
    PostgresConfig, RetryConfig, ShortfallConfig, StoreTarget,
};
pub use secret::{secret_string, SecretString, SecretValue};
