//! Code quality heuristic metric. Rather than shelling out to a linter,
//! scores structural proxies for code health: a test suite exists, the
//! tree isn't a single flat dump, and a CI config is present.

use async_trait::async_trait;
use walkdir::WalkDir;

use crate::error::RegistryResult;
use crate::metrics::traits::{DownloadedTree, Metric, MetricValue};
use crate::model::Artifact;

fn has_tests(root: &std::path::Path) -> bool {
    ["tests", "test"].iter().any(|n| root.join(n).is_dir())
        || WalkDir::new(root)
            .max_depth(3)
            .into_iter()
            .filter_map(|e| e.ok())
            .any(|e| {
                let name = e.file_name().to_string_lossy().to_lowercase();
                name.contains("test") && e.file_type().is_file()
            })
}

fn has_ci_config(root: &std::path::Path) -> bool {
    root.join(".github").join("workflows").is_dir()
        || root.join(".gitlab-ci.yml").is_file()
        || root.join(".travis.yml").is_file()
}

fn source_file_count(root: &std::path::Path) -> usize {
    WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| !e.path().components().any(|c| c.as_os_str() == ".git"))
        .count()
}

pub struct CodeQualityMetric {
    weight: f64,
}

impl CodeQualityMetric {
    pub fn new(weight: f64) -> Self {
        Self { weight }
    }
}

#[async_trait]
impl Metric for CodeQualityMetric {
    fn name(&self) -> &str {
        "code_quality"
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    async fn score(&self, tree: &DownloadedTree, _artifact: &Artifact) -> RegistryResult<MetricValue> {
        let root = tree.root().to_path_buf();
        let score = tokio::task::spawn_blocking(move || {
            let mut score = 0.0;
            if has_tests(&root) {
                score += 0.5;
            }
            if has_ci_config(&root) {
                score += 0.3;
            }
            if source_file_count(&root) > 1 {
                score += 0.2;
            }
            score
        })
        .await
        .map_err(|e| crate::error::RegistryError::rating(format!("code_quality task panicked: {e}")))?;

        Ok(MetricValue::Scalar(score.clamp(0.0, 1.0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ArtifactId, Kind};

    fn artifact() -> Artifact {
        Artifact::new(ArtifactId::from_source_url("u"), "m".to_string(), Kind::Code, "u".to_string(), 1.0)
    }

    #[tokio::test]
    async fn repo_with_tests_and_ci_scores_highly() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("tests")).unwrap();
        std::fs::write(dir.path().join("tests").join("test_x.rs"), "").unwrap();
        std::fs::create_dir_all(dir.path().join(".github").join("workflows")).unwrap();
        std::fs::write(dir.path().join("lib.rs"), "").unwrap();

        let metric = CodeQualityMetric::new(0.1);
        let value = metric
            .score(&DownloadedTree::new(dir.path()), &artifact())
            .await
            .unwrap();
        assert!(value.as_scalar() >= 0.9);
    }

    #[tokio::test]
    async fn bare_directory_scores_zero() {
        let dir = tempfile::tempdir().unwrap();
        let metric = CodeQualityMetric::new(0.1);
        let value = metric
            .score(&DownloadedTree::new(dir.path()), &artifact())
            .await
            .unwrap();
        assert_eq!(value.as_scalar(), 0.0);
    }
}
