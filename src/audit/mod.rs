//! The audit log: an append-only record of who did what to which
//! artifact, when.

pub mod backends;
pub mod config;
pub mod error;
pub mod traits;

pub use config::AuditConfig;
pub use error::{AuditError, AuditResult};
pub use traits::{new_entry, AuditLog};

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::storage::config::PostgresConfig;

/// Which audit log backend to construct. Shares `PostgresConfig` with the
/// metadata store's backend since both, in production, point at the same
/// database — just a different table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendType {
    Postgres,
    Memory,
}

impl Default for BackendType {
    fn default() -> Self {
        Self::Memory
    }
}

pub async fn build(
    config: &AuditConfig,
    postgres: Option<&PostgresConfig>,
) -> error::AuditResult<Arc<dyn AuditLog>> {
    match config.backend {
        BackendType::Memory => Ok(Arc::new(backends::memory::MemoryAuditLog::new())),
        #[cfg(feature = "postgres")]
        BackendType::Postgres => {
            let pg_config = postgres.ok_or_else(|| {
                AuditError::Configuration(
                    "backend = \"postgres\" requires a [storage.postgres] section".to_string(),
                )
            })?;
            let backend = backends::postgres::PostgresAuditLog::connect(pg_config).await?;
            Ok(Arc::new(backend))
        }
        #[cfg(not(feature = "postgres"))]
        BackendType::Postgres => Err(AuditError::Configuration(
            "backend = \"postgres\" requires the \"postgres\" feature".to_string(),
        )),
    }
}

/// A no-op audit log used when `audit.enabled = false`.
/// Every append returns `true` without recording anything; retrieval always
/// reports no history.
pub struct NullAuditLog;

#[async_trait::async_trait]
impl AuditLog for NullAuditLog {
    async fn append(&self, _entry: crate::model::AuditEntry) -> error::AuditResult<bool> {
        Ok(true)
    }

    async fn get_by_artifact(
        &self,
        _id: &crate::model::ArtifactId,
        _kind: crate::model::Kind,
    ) -> error::AuditResult<Option<Vec<crate::model::AuditEntry>>> {
        Ok(None)
    }

    async fn reset(&self) -> error::AuditResult<()> {
        Ok(())
    }
}
