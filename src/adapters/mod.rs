//! External integrations
//!
//! Adapters wrap everything outside the core pipeline: the upstream
//! reporting API, the record stores, and the reference override table.

pub mod openfda;
pub mod reference;
pub mod store;
