//! Domain models and types for Shortfall.
//!
//! This module contains the core domain models, types, and business rules:
//!
//! - **Record models** ([`RawUpdateRecord`], [`ClassifiedRecord`])
//! - **Canonical status** ([`AvailabilityStatus`])
//! - **Derived episodes** ([`Episode`])
//! - **Error types** ([`ShortfallError`], [`FetchError`], [`PersistenceError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, ShortfallError>`]:
//!
//! ```rust
//! use shortfall::domain::{Result, ShortfallError};
//!
//! fn example() -> Result<()> {
//!     Err(ShortfallError::Parse("unexpected payload shape".to_string()))
//! }
//! ```

pub mod episode;
pub mod errors;
pub mod record;
pub mod result;
pub mod status;

// Re-export commonly used types for convenience
pub use episode::Episode;
pub use errors::{FetchError, PersistenceError, ShortfallError};
pub use record::{ClassifiedRecord, RawUpdateRecord};
pub use result::Result;
pub use status::AvailabilityStatus;
