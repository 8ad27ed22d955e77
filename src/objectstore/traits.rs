//! The object store adapter's public contract.

use async_trait::async_trait;
use std::time::Duration;

use super::error::ObjectResult;
use crate::model::ArtifactId;

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload an archive's bytes under the artifact's namespaced key.
    async fn upload(&self, id: &ArtifactId, bytes: Vec<u8>) -> ObjectResult<()>;

    async fn delete(&self, id: &ArtifactId) -> ObjectResult<()>;

    async fn exists(&self, id: &ArtifactId) -> ObjectResult<bool>;

    /// A time-limited URL a client can use to download the blob directly,
    /// bypassing the registry.
    async fn presigned_get(&self, id: &ArtifactId, ttl: Duration) -> ObjectResult<String>;

    /// Removes every object under the configured namespace. Used only by
    /// the `/reset` hard-reset endpoint.
    async fn reset(&self) -> ObjectResult<()>;
}
