//! SocialSwap Core Library
//!
//! Error taxonomy, the Entity Store port traits implemented by the storage
//! backends, and the pure listing query engine.

// Re-export pure types from socialswap-types
pub use socialswap_types::*;

pub mod error;
pub mod ports;
pub mod query;

pub use error::{Constraint, Result, StoreError};
pub use ports::EntityStore;
