//! The object store adapter: authoritative binary storage for
//! artifact archives.

pub mod backends;
pub mod config;
pub mod error;
pub mod traits;

pub use config::{BackendType, FileConfig, ObjectStoreConfig, S3Config};
pub use error::{ObjectError, ObjectResult};
pub use traits::ObjectStore;

use std::sync::Arc;

pub async fn build(config: &ObjectStoreConfig) -> error::ObjectResult<Arc<dyn ObjectStore>> {
    match config.backend {
        BackendType::File => {
            let file_config = config.file.clone().ok_or_else(|| {
                ObjectError::Configuration(
                    "backend = \"file\" requires an [object_store.file] section".to_string(),
                )
            })?;
            let backend = backends::file::FileBackend::open(&file_config).await?;
            Ok(Arc::new(backend))
        }
        #[cfg(feature = "s3")]
        BackendType::S3 => {
            let s3_config = config.s3.as_ref().ok_or_else(|| {
                ObjectError::Configuration(
                    "backend = \"s3\" requires an [object_store.s3] section".to_string(),
                )
            })?;
            let backend = backends::s3::S3Backend::connect(s3_config).await?;
            Ok(Arc::new(backend))
        }
        #[cfg(not(feature = "s3"))]
        BackendType::S3 => Err(ObjectError::Configuration(
            "backend = \"s3\" requires the \"s3\" feature".to_string(),
        )),
    }
}
