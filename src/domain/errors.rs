//! Domain error types
//!
//! This module defines the error hierarchy for Shortfall. All errors are
//! domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main Shortfall error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum ShortfallError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Upstream fetch errors (network/API failure)
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Malformed upstream payload
    #[error("Parse error: {0}")]
    Parse(String),

    /// Store read/write errors
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// Best-effort schema assurance errors (non-fatal at the run level)
    #[error("Schema error: {0}")]
    Schema(String),

    /// ETL orchestration errors
    #[error("ETL error: {0}")]
    Etl(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Fetch-specific errors
///
/// Errors that occur when querying the upstream shortage reporting API.
/// These errors don't expose third-party HTTP client types.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Failed to connect to the upstream API
    #[error("Failed to connect to upstream API: {0}")]
    ConnectionFailed(String),

    /// Invalid response from the API
    #[error("Invalid response from upstream API: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded, retry after: {0}")]
    RateLimitExceeded(String),

    /// Server error (5xx)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Client error (4xx)
    #[error("Client error: {status} - {message}")]
    ClientError { status: u16, message: String },

    /// Timeout
    #[error("Request timeout: {0}")]
    Timeout(String),
}

/// Persistence-specific errors
///
/// Errors that occur when reading or writing the staging/historical stores.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Failed to connect to the store
    #[error("Failed to connect to store: {0}")]
    ConnectionFailed(String),

    /// Query failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Upsert failed
    #[error("Upsert failed: {0}")]
    UpsertFailed(String),

    /// Delete failed
    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    /// Failed to decode a stored row
    #[error("Failed to decode stored row: {0}")]
    DecodeFailed(String),
}

// Conversion from std::io::Error
impl From<std::io::Error> for ShortfallError {
    fn from(err: std::io::Error) -> Self {
        ShortfallError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for ShortfallError {
    fn from(err: serde_json::Error) -> Self {
        ShortfallError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for ShortfallError {
    fn from(err: toml::de::Error) -> Self {
        ShortfallError::Configuration(format!("TOML parse error: {err}"))
    }
}
