//! The response cache: fingerprint-keyed, artifact-scoped invalidation.

pub mod backends;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod traits;

pub use config::{BackendType, CacheConfig, RedisConfig};
pub use error::{CacheError, CacheResult};
pub use fingerprint::{cache_key, fingerprint, invalidation_prefix};
pub use traits::ResponseCache;

use std::sync::Arc;

pub async fn build(config: &CacheConfig) -> error::CacheResult<Arc<dyn ResponseCache>> {
    match config.backend {
        BackendType::Memory => Ok(Arc::new(backends::memory::MemoryCache::new(config.ttl))),
        #[cfg(feature = "redis")]
        BackendType::Redis => {
            let redis_config = config.redis.as_ref().ok_or_else(|| {
                CacheError::Configuration(
                    "backend = \"redis\" requires a [cache.redis] section".to_string(),
                )
            })?;
            let backend = backends::redis::RedisCache::connect(redis_config, config.ttl)?;
            Ok(Arc::new(backend))
        }
        #[cfg(not(feature = "redis"))]
        BackendType::Redis => Err(CacheError::Configuration(
            "backend = \"redis\" requires the \"redis\" feature".to_string(),
        )),
    }
}
