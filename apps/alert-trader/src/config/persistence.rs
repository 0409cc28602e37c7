//! Ledger and queue storage settings.

use serde::{Deserialize, Serialize};

/// Storage backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersistenceBackend {
    /// Process memory; lost on restart.
    Memory,
    /// SQLite database file.
    #[default]
    Sqlite,
}

/// `persistence:` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Backend.
    #[serde(default)]
    pub backend: PersistenceBackend,
    /// SQLite URL.
    #[serde(default = "default_database_url")]
    pub database_url: String,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            backend: PersistenceBackend::default(),
            database_url: default_database_url(),
        }
    }
}

fn default_database_url() -> String {
    "sqlite://./data/alert-trader.db".to_string()
}
