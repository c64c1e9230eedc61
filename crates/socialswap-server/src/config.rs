//! Server configuration
//!
//! Read from `SOCIALSWAP_*` environment variables, e.g.
//! `SOCIALSWAP_BACKEND=sqlite SOCIALSWAP_DATABASE_PATH=/var/lib/socialswap.db`.

use anyhow::{Context, Result};
use ::config::{Config, Environment};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Memory,
    Sqlite,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub backend: Backend,
    pub database_path: String,
    pub bind_address: String,
    /// Create the demo accounts and listings when the store has no accounts
    pub seed_demo_data: bool,
}

impl ServerConfig {
    pub fn load() -> Result<Self> {
        Self::from_env(Environment::with_prefix("SOCIALSWAP"))
    }

    fn from_env(env: Environment) -> Result<Self> {
        Config::builder()
            .set_default("backend", "memory")?
            .set_default("database_path", "data/socialswap.db")?
            .set_default("bind_address", "0.0.0.0:5000")?
            .set_default("seed_demo_data", true)?
            .add_source(env.try_parsing(true))
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }
}
