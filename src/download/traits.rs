//! The downloader interface's public contract.

use async_trait::async_trait;
use std::path::Path;

use super::error::DownloadResult;
use crate::model::Kind;

/// Fetches an artifact's files into a scratch directory and reports the
/// resulting size. Implementations are per-origin (model hub, code
/// hosting service); `crate::download::build` picks one by `kind`.
#[async_trait]
pub trait Downloader: Send + Sync {
    async fn download(
        &self,
        source_url: &str,
        kind: Kind,
        scratch_dir: &Path,
    ) -> DownloadResult<f64>;
}
