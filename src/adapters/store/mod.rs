//! Store adapters
//!
//! The staging and historical stores share the thin [`RecordStore`]
//! interface; backends are selected by configuration through the factory.

pub mod factory;
pub mod memory;
pub mod postgres;
pub mod traits;

pub use factory::{create_stores, Stores};
pub use memory::MemoryStore;
pub use traits::{OverrideSource, RecordStore};
