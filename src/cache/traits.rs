//! The response cache's public contract.
//!
//! The cache is a pure proxy: it is never read from to compute a result
//! that is then written back to the store. It only ever wraps a
//! deterministic GET of an opaque body.

use async_trait::async_trait;

use super::error::CacheResult;

#[async_trait]
pub trait ResponseCache: Send + Sync {
    async fn insert(&self, key: &str, body: Vec<u8>) -> CacheResult<()>;

    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>>;

    async fn delete(&self, key: &str) -> CacheResult<()>;

    /// Invalidates every key enumerable by the `artifact:{id}:{kind}:*`
    /// prefix and returns how many were removed.
    async fn delete_by_artifact(&self, artifact_id: &str, kind: &str) -> CacheResult<usize>;

    /// Hard reset, used by `DELETE /reset`.
    async fn reset(&self) -> CacheResult<()>;
}
