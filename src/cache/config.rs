//! Response cache configuration: `cache.{host, port, password,
//! ttl_seconds}`.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendType {
    /// Redis-compatible store via `deadpool-redis` (production default).
    Redis,
    /// In-process, for tests and local development.
    Memory,
}

impl Default for BackendType {
    fn default() -> Self {
        Self::Memory
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub password: Option<String>,
}

fn default_port() -> u16 {
    6379
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub backend: BackendType,
    pub redis: Option<RedisConfig>,
    /// How long a cache entry lives before it's treated as a miss.
    #[serde(with = "humantime_serde", default = "default_ttl")]
    pub ttl: Duration,
}

fn default_ttl() -> Duration {
    Duration::from_secs(300)
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: BackendType::default(),
            redis: None,
            ttl: default_ttl(),
        }
    }
}
