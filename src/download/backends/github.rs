//! Code hosting service downloader: clones a GitHub repository into the
//! scratch directory with `git2`.

use async_trait::async_trait;
use std::path::Path;
use walkdir::WalkDir;

use crate::download::error::{DownloadError, DownloadResult};
use crate::download::traits::Downloader;
use crate::model::Kind;

pub struct GitHubDownloader;

impl GitHubDownloader {
    pub fn new() -> Self {
        Self
    }

    fn directory_size_mb(path: &Path) -> f64 {
        let bytes: u64 = WalkDir::new(path)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| e.metadata().ok())
            .map(|m| m.len())
            .sum();
        bytes as f64 / (1024.0 * 1024.0)
    }
}

impl Default for GitHubDownloader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Downloader for GitHubDownloader {
    async fn download(
        &self,
        source_url: &str,
        kind: Kind,
        scratch_dir: &Path,
    ) -> DownloadResult<f64> {
        if kind != Kind::Code {
            return Err(DownloadError::UnsupportedKind(format!(
                "GitHubDownloader only handles kind=code, got {kind}"
            )));
        }
        if !source_url.contains("github.com") {
            return Err(DownloadError::UnsupportedKind(format!(
                "not a github.com URL: {source_url}"
            )));
        }

        let url = source_url.to_string();
        let dest = scratch_dir.to_path_buf();
        let clone_result = tokio::task::spawn_blocking(move || git2::Repository::clone(&url, &dest))
            .await
            .map_err(|e| DownloadError::Transient(format!("clone task panicked: {e}")))?;

        match clone_result {
            Ok(_repo) => Ok(Self::directory_size_mb(scratch_dir)),
            Err(e) if matches!(e.code(), git2::ErrorCode::NotFound | git2::ErrorCode::Auth) => {
                Err(DownloadError::NotFound(format!("{source_url}: {e}")))
            }
            Err(e) => Err(DownloadError::Transient(e.to_string())),
        }
    }
}
