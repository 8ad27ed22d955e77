//! Metadata store configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which metadata store backend to construct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendType {
    /// PostgreSQL via `sqlx` (production default).
    Postgres,
    /// In-process, for tests and local development.
    Memory,
}

impl Default for BackendType {
    fn default() -> Self {
        Self::Memory
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostgresConfig {
    pub connection_string: String,
    #[serde(default = "default_pool_size")]
    pub max_connections: u32,
    #[serde(with = "humantime_serde", default = "default_timeout")]
    pub connection_timeout: Duration,
    #[serde(default = "default_schema")]
    pub schema: String,
}

fn default_pool_size() -> u32 {
    10
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_schema() -> String {
    "public".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: BackendType,
    pub postgres: Option<PostgresConfig>,
    /// Artifacts returned per `get_by_query` page. The hard cap applies
    /// per page, not to the whole result set.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_page_size() -> usize {
    50
}
