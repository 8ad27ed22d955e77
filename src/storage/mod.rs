//! The metadata store: the typed catalog of artifacts, their edges,
//! readmes, and ratings.

pub mod backends;
pub mod config;
pub mod error;
pub mod traits;

pub use config::{BackendType, PostgresConfig, StorageConfig};
pub use error::{StorageError, StorageResult};
pub use traits::{LinkedNames, MetadataStore, ParentLink};

use std::sync::Arc;

/// Build the configured [`MetadataStore`] implementation.
///
/// Returns a boxed trait object so callers (the accessor, the HTTP API
/// state) don't need to know which backend is live.
pub async fn build(config: &StorageConfig) -> error::StorageResult<Arc<dyn MetadataStore>> {
    match config.backend {
        BackendType::Memory => Ok(Arc::new(backends::memory::MemoryBackend::new())),
        #[cfg(feature = "postgres")]
        BackendType::Postgres => {
            let pg_config = config.postgres.as_ref().ok_or_else(|| {
                StorageError::Configuration(
                    "backend = \"postgres\" requires a [storage.postgres] section".to_string(),
                )
            })?;
            let backend = backends::postgres::PostgresBackend::connect(pg_config).await?;
            Ok(Arc::new(backend))
        }
        #[cfg(not(feature = "postgres"))]
        BackendType::Postgres => Err(StorageError::Configuration(
            "backend = \"postgres\" requires the \"postgres\" feature".to_string(),
        )),
    }
}
