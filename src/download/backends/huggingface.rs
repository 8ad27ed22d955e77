//! Model hub downloader: pulls a model or dataset's file listing from the
//! Hugging Face Hub HTTP API and writes each file into the scratch
//! directory.
//!
//! Hits the public `api/models`/`api/datasets` listing endpoint directly
//! with `reqwest` and streams each sibling file, keeping the downloader
//! free of any hub-specific SDK dependency.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::download::error::{DownloadError, DownloadResult};
use crate::download::traits::Downloader;
use crate::model::Kind;

const HF_BASE: &str = "https://huggingface.co";

#[derive(Debug, Deserialize)]
struct HfRepoInfo {
    #[serde(default)]
    siblings: Vec<HfSibling>,
}

#[derive(Debug, Deserialize)]
struct HfSibling {
    rfilename: String,
}

pub struct HuggingFaceDownloader {
    client: reqwest::Client,
}

impl HuggingFaceDownloader {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(60))
                .build()
                .expect("reqwest client construction"),
        }
    }

    fn repo_id(url: &str, kind: Kind) -> DownloadResult<String> {
        let rest = url
            .strip_prefix("https://huggingface.co/")
            .or_else(|| url.strip_prefix("http://huggingface.co/"))
            .ok_or_else(|| {
                DownloadError::UnsupportedKind(format!("not a huggingface.co URL: {url}"))
            })?;
        let segments: Vec<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();

        match kind {
            Kind::Code => Err(DownloadError::UnsupportedKind(
                "cannot retrieve code from a huggingface.co URL".to_string(),
            )),
            Kind::Dataset => {
                if segments.len() < 3 || segments[0] != "datasets" {
                    return Err(DownloadError::NotFound(format!("invalid dataset url: {url}")));
                }
                Ok(format!("{}/{}", segments[1], segments[2]))
            }
            Kind::Model => {
                if segments.len() < 2 {
                    return Err(DownloadError::NotFound(format!("invalid model url: {url}")));
                }
                Ok(format!("{}/{}", segments[0], segments[1]))
            }
        }
    }

    fn api_path(kind: Kind, repo_id: &str) -> String {
        match kind {
            Kind::Dataset => format!("{HF_BASE}/api/datasets/{repo_id}"),
            _ => format!("{HF_BASE}/api/models/{repo_id}"),
        }
    }
}

impl Default for HuggingFaceDownloader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Downloader for HuggingFaceDownloader {
    async fn download(
        &self,
        source_url: &str,
        kind: Kind,
        scratch_dir: &Path,
    ) -> DownloadResult<f64> {
        let repo_id = Self::repo_id(source_url, kind)?;

        let info_resp = self
            .client
            .get(Self::api_path(kind, &repo_id))
            .send()
            .await
            .map_err(|e| DownloadError::Transient(e.to_string()))?;

        if info_resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(DownloadError::NotFound(format!("{repo_id} not found on hub")));
        }
        if !info_resp.status().is_success() {
            return Err(DownloadError::Transient(format!(
                "hub API returned {}",
                info_resp.status()
            )));
        }

        let info: HfRepoInfo = info_resp
            .json()
            .await
            .map_err(|e| DownloadError::Transient(format!("malformed hub API response: {e}")))?;

        let mut total_bytes: u64 = 0;
        let resolve_prefix = match kind {
            Kind::Dataset => format!("{HF_BASE}/datasets/{repo_id}/resolve/main"),
            _ => format!("{HF_BASE}/{repo_id}/resolve/main"),
        };

        for sibling in &info.siblings {
            let file_url = format!("{resolve_prefix}/{}", sibling.rfilename);
            let bytes = self
                .client
                .get(&file_url)
                .send()
                .await
                .map_err(|e| DownloadError::Transient(e.to_string()))?
                .bytes()
                .await
                .map_err(|e| DownloadError::Transient(e.to_string()))?;

            let dest = scratch_dir.join(&sibling.rfilename);
            if let Some(parent) = dest.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| DownloadError::Transient(e.to_string()))?;
            }
            tokio::fs::write(&dest, &bytes)
                .await
                .map_err(|e| DownloadError::Transient(e.to_string()))?;
            total_bytes += bytes.len() as u64;
        }

        Ok(total_bytes as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_id_from_model_url() {
        let id = HuggingFaceDownloader::repo_id(
            "https://huggingface.co/google/bert-base-uncased",
            Kind::Model,
        )
        .unwrap();
        assert_eq!(id, "google/bert-base-uncased");
    }

    #[test]
    fn repo_id_from_dataset_url() {
        let id = HuggingFaceDownloader::repo_id(
            "https://huggingface.co/datasets/rajpurkar/squad",
            Kind::Dataset,
        )
        .unwrap();
        assert_eq!(id, "rajpurkar/squad");
    }

    #[test]
    fn code_kind_is_unsupported() {
        let err = HuggingFaceDownloader::repo_id("https://huggingface.co/x/y", Kind::Code);
        assert!(matches!(err, Err(DownloadError::UnsupportedKind(_))));
    }
}
