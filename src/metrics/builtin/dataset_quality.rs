//! Dataset quality heuristic metric. Scores structural proxies available
//! in the downloaded tree rather than hub-side popularity signals: a
//! dataset card, a declared license, and a machine-readable schema/info
//! file.

use async_trait::async_trait;

use crate::error::RegistryResult;
use crate::metrics::traits::{DownloadedTree, Metric, MetricValue};
use crate::model::Artifact;

fn has_dataset_card(root: &std::path::Path) -> bool {
    ["README.md", "dataset_card.md", "DATASET_CARD.md"]
        .iter()
        .any(|n| root.join(n).is_file())
}

fn has_schema_file(root: &std::path::Path) -> bool {
    ["dataset_infos.json", "schema.json", "dataset_schema.json"]
        .iter()
        .any(|n| root.join(n).is_file())
        || std::fs::read_dir(root)
            .map(|mut entries| {
                entries.any(|e| {
                    e.ok()
                        .map(|e| {
                            let name = e.file_name().to_string_lossy().to_lowercase();
                            name.ends_with(".parquet") || name.ends_with(".arrow")
                        })
                        .unwrap_or(false)
                })
            })
            .unwrap_or(false)
}

fn declares_permissive_license(root: &std::path::Path) -> bool {
    let Ok(text) = std::fs::read_to_string(root.join("README.md")) else {
        return false;
    };
    let lower = text.to_lowercase();
    ["mit", "apache", "cc0", "cc-by"].iter().any(|s| lower.contains(s))
}

pub struct DatasetQualityMetric {
    weight: f64,
}

impl DatasetQualityMetric {
    pub fn new(weight: f64) -> Self {
        Self { weight }
    }
}

#[async_trait]
impl Metric for DatasetQualityMetric {
    fn name(&self) -> &str {
        "dataset_quality"
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    async fn score(&self, tree: &DownloadedTree, _artifact: &Artifact) -> RegistryResult<MetricValue> {
        let root = tree.root().to_path_buf();
        let score = tokio::task::spawn_blocking(move || {
            let mut score = 0.0;
            if has_dataset_card(&root) {
                score += 0.4;
            }
            if has_schema_file(&root) {
                score += 0.3;
            }
            if declares_permissive_license(&root) {
                score += 0.3;
            }
            score
        })
        .await
        .map_err(|e| crate::error::RegistryError::rating(format!("dataset_quality task panicked: {e}")))?;

        Ok(MetricValue::Scalar(score.clamp(0.0, 1.0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ArtifactId, Kind};

    fn artifact() -> Artifact {
        Artifact::new(ArtifactId::from_source_url("u"), "m".to_string(), Kind::Dataset, "u".to_string(), 1.0)
    }

    #[tokio::test]
    async fn well_documented_dataset_scores_highly() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("README.md"), "Licensed under Apache-2.0.").unwrap();
        std::fs::write(dir.path().join("dataset_infos.json"), "{}").unwrap();

        let metric = DatasetQualityMetric::new(0.1);
        let value = metric
            .score(&DownloadedTree::new(dir.path()), &artifact())
            .await
            .unwrap();
        assert!((value.as_scalar() - 1.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn bare_dataset_scores_zero() {
        let dir = tempfile::tempdir().unwrap();
        let metric = DatasetQualityMetric::new(0.1);
        let value = metric
            .score(&DownloadedTree::new(dir.path()), &artifact())
            .await
            .unwrap();
        assert_eq!(value.as_scalar(), 0.0);
    }
}
