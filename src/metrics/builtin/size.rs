//! Structured per-deployment-target size score.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RegistryResult;
use crate::metrics::traits::{DownloadedTree, Metric, MetricValue};
use crate::model::{Artifact, DeploymentTargetScores};

/// Max size (MB) each deployment target tolerates before the score floors
/// at zero. Defaults scale to plausible device memory budgets.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SizeThresholds {
    pub rpi_max_mb: f64,
    pub jetson_max_mb: f64,
    pub desktop_max_mb: f64,
    pub aws_max_mb: f64,
}

impl Default for SizeThresholds {
    fn default() -> Self {
        Self {
            rpi_max_mb: 512.0,
            jetson_max_mb: 4096.0,
            desktop_max_mb: 32_768.0,
            aws_max_mb: 262_144.0,
        }
    }
}

fn score_with_max(max_size: f64, size: f64) -> f64 {
    let remaining = max_size - size;
    if remaining < 0.0 {
        0.0
    } else {
        (remaining / max_size).clamp(0.0, 1.0)
    }
}

pub struct SizeMetric {
    weight: f64,
    thresholds: SizeThresholds,
}

impl SizeMetric {
    pub fn new(weight: f64, thresholds: SizeThresholds) -> Self {
        Self { weight, thresholds }
    }
}

#[async_trait]
impl Metric for SizeMetric {
    fn name(&self) -> &str {
        "size_score"
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    async fn score(&self, _tree: &DownloadedTree, artifact: &Artifact) -> RegistryResult<MetricValue> {
        let size = artifact.data.size_mb;
        Ok(MetricValue::Size(DeploymentTargetScores {
            rpi: score_with_max(self.thresholds.rpi_max_mb, size),
            jetson: score_with_max(self.thresholds.jetson_max_mb, size),
            desktop: score_with_max(self.thresholds.desktop_max_mb, size),
            aws: score_with_max(self.thresholds.aws_max_mb, size),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ArtifactId, Kind};

    #[tokio::test]
    async fn tiny_artifact_scores_near_one_everywhere() {
        let metric = SizeMetric::new(0.1, SizeThresholds::default());
        let artifact = Artifact::new(
            ArtifactId::from_source_url("u"),
            "m".to_string(),
            Kind::Model,
            "u".to_string(),
            1.0,
        );
        let tree = DownloadedTree::new("/tmp");
        let value = metric.score(&tree, &artifact).await.unwrap();
        let scores = value.size_breakdown().unwrap();
        assert!(scores.rpi > 0.99);
        assert!(scores.aws > 0.99);
    }

    #[tokio::test]
    async fn oversized_artifact_floors_at_zero_for_small_targets() {
        let metric = SizeMetric::new(0.1, SizeThresholds::default());
        let artifact = Artifact::new(
            ArtifactId::from_source_url("u"),
            "m".to_string(),
            Kind::Model,
            "u".to_string(),
            100_000.0,
        );
        let tree = DownloadedTree::new("/tmp");
        let value = metric.score(&tree, &artifact).await.unwrap();
        let scores = value.size_breakdown().unwrap();
        assert_eq!(scores.rpi, 0.0);
        assert_eq!(scores.jetson, 0.0);
        assert!(scores.aws > 0.0);
    }
}
