//! Error type for the response cache. Never propagated to a client:
//! every caller treats a cache failure as a miss.

use thiserror::Error;

pub type CacheResult<T> = Result<T, CacheError>;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache backend error: {0}")]
    Backend(String),

    #[error("cache configuration error: {0}")]
    Configuration(String),
}

impl From<CacheError> for crate::error::RegistryError {
    fn from(err: CacheError) -> Self {
        crate::error::RegistryError::cache(err.to_string())
    }
}
