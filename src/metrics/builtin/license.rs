//! License compatibility metric.
//!
//! Scores 1.0 when the artifact declares an LGPL-2.1-compatible license
//! (found in a top-level `LICENSE*` file or the README's `license:`
//! front-matter key), 0.0 otherwise.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::RegexSet;
use std::path::Path;

use crate::error::RegistryResult;
use crate::metrics::traits::{DownloadedTree, Metric, MetricValue};
use crate::model::Artifact;

static ALLOW_LIST: Lazy<RegexSet> = Lazy::new(|| {
    RegexSet::new([
        r"(?i)\bmit\b",
        r"(?i)\bbsd-2-clause\b",
        r"(?i)\bbsd-3-clause\b",
        r"(?i)\bapache[- ]2\.0\b",
        r"(?i)\blgpl-2\.1\b",
        r"(?i)\blgpl-3\.0\b",
        r"(?i)\bmpl-2\.0\b",
        r"(?i)\bcc-by-4\.0\b",
    ])
    .unwrap()
});

fn license_files(root: &Path) -> Vec<std::path::PathBuf> {
    let mut out = Vec::new();
    if let Ok(entries) = std::fs::read_dir(root) {
        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().to_lowercase();
            if name.starts_with("license") || name.starts_with("copying") {
                out.push(entry.path());
            }
        }
    }
    out
}

pub struct LicenseMetric {
    weight: f64,
}

impl LicenseMetric {
    pub fn new(weight: f64) -> Self {
        Self { weight }
    }
}

#[async_trait]
impl Metric for LicenseMetric {
    fn name(&self) -> &str {
        "license"
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    async fn score(&self, tree: &DownloadedTree, _artifact: &Artifact) -> RegistryResult<MetricValue> {
        for path in license_files(tree.root()) {
            if let Ok(text) = tokio::fs::read_to_string(&path).await {
                if ALLOW_LIST.is_match(&text) {
                    return Ok(MetricValue::Scalar(1.0));
                }
            }
        }

        let readme_path = tree.root().join("README.md");
        if let Ok(text) = tokio::fs::read_to_string(&readme_path).await {
            if ALLOW_LIST.is_match(&text) {
                return Ok(MetricValue::Scalar(1.0));
            }
        }

        Ok(MetricValue::Scalar(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ArtifactId, Kind};

    fn artifact() -> Artifact {
        Artifact::new(ArtifactId::from_source_url("u"), "m".to_string(), Kind::Model, "u".to_string(), 1.0)
    }

    #[tokio::test]
    async fn allowlisted_license_scores_one() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("LICENSE"), "MIT License\n\nCopyright...").unwrap();
        let metric = LicenseMetric::new(0.1);
        let tree = DownloadedTree::new(dir.path());
        let value = metric.score(&tree, &artifact()).await.unwrap();
        assert_eq!(value.as_scalar(), 1.0);
    }

    #[tokio::test]
    async fn missing_license_scores_zero() {
        let dir = tempfile::tempdir().unwrap();
        let metric = LicenseMetric::new(0.1);
        let tree = DownloadedTree::new(dir.path());
        let value = metric.score(&tree, &artifact()).await.unwrap();
        assert_eq!(value.as_scalar(), 0.0);
    }

    #[tokio::test]
    async fn non_allowlisted_license_scores_zero() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("LICENSE"), "AGPL-3.0-only").unwrap();
        let metric = LicenseMetric::new(0.1);
        let tree = DownloadedTree::new(dir.path());
        let value = metric.score(&tree, &artifact()).await.unwrap();
        assert_eq!(value.as_scalar(), 0.0);
    }
}
