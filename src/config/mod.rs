//! Top-level, environment-driven configuration.
//!
//! Recognized environment variables carry a `REGISTRY_` prefix
//! (`REGISTRY_DB_URL`, `REGISTRY_INGEST_THRESHOLD`, ...). An optional TOML
//! file can override any of them; environment values win when both are
//! present, since the environment is what a deployment actually controls
//! at runtime.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::audit::AuditConfig;
use crate::cache::CacheConfig;
use crate::error::{RegistryError, RegistryResult};
use crate::ingest::IngestConfig;
use crate::metrics::RaterConfig;
use crate::objectstore::ObjectStoreConfig;
use crate::storage::StorageConfig;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RegistryConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub object_store: ObjectStoreConfig,
    #[serde(default)]
    pub rater: RaterConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub audit: AuditConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub log_level: LogLevel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Default for LogLevel {
    fn default() -> Self {
        Self::Info
    }
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl RegistryConfig {
    /// Loads a file-based override (if `path` exists) and then layers the
    /// process environment on top of it.
    pub fn load(path: Option<&Path>) -> RegistryResult<Self> {
        let mut config = match path {
            Some(p) if p.exists() => {
                let body = std::fs::read_to_string(p)
                    .map_err(|e| RegistryError::config(format!("reading {}: {e}", p.display())))?;
                toml::from_str(&body)
                    .map_err(|e| RegistryError::config(format!("parsing {}: {e}", p.display())))?
            }
            _ => Self::default(),
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> RegistryResult<()> {
        use std::env::var;

        if let Ok(url) = var("REGISTRY_DB_URL") {
            self.storage.backend = crate::storage::BackendType::Postgres;
            let mut pg = self.storage.postgres.clone().unwrap_or(crate::storage::PostgresConfig {
                connection_string: url.clone(),
                max_connections: 10,
                connection_timeout: std::time::Duration::from_secs(30),
                schema: "public".to_string(),
            });
            pg.connection_string = url;
            self.storage.postgres = Some(pg);
        }

        if let Ok(v) = var("REGISTRY_INGEST_THRESHOLD") {
            self.rater.ingest_threshold = v
                .parse()
                .map_err(|_| RegistryError::config("REGISTRY_INGEST_THRESHOLD must be a float"))?;
        }
        if let Ok(v) = var("REGISTRY_RATER_WORKERS") {
            self.rater.rater_workers = v
                .parse()
                .map_err(|_| RegistryError::config("REGISTRY_RATER_WORKERS must be an integer"))?;
        }
        if let Ok(v) = var("REGISTRY_RATER_PROCESSES_PER_JOB") {
            self.rater.rater_processes_per_job = v.parse().map_err(|_| {
                RegistryError::config("REGISTRY_RATER_PROCESSES_PER_JOB must be an integer")
            })?;
        }
        if let Ok(v) = var("REGISTRY_DEFERRED_QUEUE_CAPACITY") {
            self.ingest.deferred_queue_capacity = v.parse().map_err(|_| {
                RegistryError::config("REGISTRY_DEFERRED_QUEUE_CAPACITY must be an integer")
            })?;
        }
        if let Ok(v) = var("REGISTRY_INGEST_ASYNCHRONOUS") {
            self.ingest.ingest_asynchronous = v
                .parse()
                .map_err(|_| RegistryError::config("REGISTRY_INGEST_ASYNCHRONOUS must be true/false"))?;
        }
        if let Ok(v) = var("REGISTRY_AUDIT_ENABLED") {
            self.audit.enabled = v
                .parse()
                .map_err(|_| RegistryError::config("REGISTRY_AUDIT_ENABLED must be true/false"))?;
        }
        if let Ok(host) = var("REGISTRY_CACHE_HOST") {
            self.cache.backend = crate::cache::BackendType::Redis;
            let mut redis = self.cache.redis.clone().unwrap_or(crate::cache::RedisConfig {
                host: host.clone(),
                port: 6379,
                password: None,
            });
            redis.host = host;
            if let Ok(port) = var("REGISTRY_CACHE_PORT") {
                redis.port = port
                    .parse()
                    .map_err(|_| RegistryError::config("REGISTRY_CACHE_PORT must be an integer"))?;
            }
            if let Ok(password) = var("REGISTRY_CACHE_PASSWORD") {
                redis.password = Some(password);
            }
            self.cache.redis = Some(redis);
        }
        if let Ok(v) = var("REGISTRY_CACHE_TTL_SECONDS") {
            let secs: u64 = v
                .parse()
                .map_err(|_| RegistryError::config("REGISTRY_CACHE_TTL_SECONDS must be an integer"))?;
            self.cache.ttl = std::time::Duration::from_secs(secs);
        }
        if let Ok(bind) = var("REGISTRY_HTTP_BIND") {
            self.http.bind = bind;
        }

        if let Ok(url) = var("REGISTRY_OBJECT_STORE_URL") {
            self.object_store.backend = crate::objectstore::BackendType::S3;
            let bucket = var("REGISTRY_OBJECT_STORE_BUCKET").unwrap_or_default();
            let access_key = var("REGISTRY_OBJECT_STORE_ACCESS_KEY").unwrap_or_default();
            let secret_key = var("REGISTRY_OBJECT_STORE_SECRET_KEY").unwrap_or_default();
            let prefix = var("REGISTRY_OBJECT_STORE_PREFIX").unwrap_or_else(|_| "artifacts".to_string());
            let region = var("REGISTRY_OBJECT_STORE_REGION").unwrap_or_else(|_| "us-east-1".to_string());
            self.object_store.s3 = Some(crate::objectstore::S3Config {
                url: Some(url),
                access_key,
                secret_key,
                bucket,
                prefix,
                region,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_memory_backends() {
        let config = RegistryConfig::default();
        assert_eq!(config.storage.backend, crate::storage::BackendType::Memory);
        assert_eq!(config.cache.backend, crate::cache::BackendType::Memory);
    }

    #[test]
    fn missing_override_file_falls_back_to_defaults() {
        let config = RegistryConfig::load(Some(Path::new("/nonexistent/registry.toml"))).unwrap();
        assert_eq!(config.http.bind, "0.0.0.0:8080");
    }
}
