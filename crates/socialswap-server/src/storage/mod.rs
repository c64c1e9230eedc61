//! Storage layer
//!
//! Two interchangeable backends for the Entity Store contract:
//! SQLite (embedded, durable) and DashMap (in-process, ephemeral).

pub mod db;
pub mod memory;

pub use db::Database;
pub use memory::MemoryStore;

use crate::config::{Backend, ServerConfig};
use anyhow::Result;
use socialswap_core::EntityStore;
use std::sync::Arc;

/// Build the store selected by configuration
pub async fn open(config: &ServerConfig) -> Result<Arc<dyn EntityStore>> {
    match config.backend {
        Backend::Memory => {
            tracing::info!("Using in-memory store (data is lost on shutdown)");
            Ok(Arc::new(MemoryStore::new()))
        }
        Backend::Sqlite => {
            tracing::info!("Using SQLite store at: {}", config.database_path);
            Ok(Arc::new(Database::new(&config.database_path).await?))
        }
    }
}
