//! Bus-factor metric: counts distinct contributors via `git2` over the
//! already-downloaded tree rather than shelling out to `git shortlog`.

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::Path;

use crate::error::RegistryResult;
use crate::metrics::traits::{DownloadedTree, Metric, MetricValue};
use crate::model::Artifact;

/// `1 - 0.5^(contributors / half_point)`: half_point contributors yields
/// 0.5, more contributors asymptotically approach 1.0.
fn score_large_good(half_point: f64, x: f64) -> f64 {
    if half_point <= 0.0 {
        return 1.0;
    }
    (1.0 - 0.5f64.powf(x / half_point)).clamp(0.0, 1.0)
}

fn count_contributors(root: &Path) -> usize {
    let Ok(repo) = git2::Repository::open(root) else {
        // No git history available (e.g. a model/dataset snapshot
        // without `.git`); a single unknown contributor is the
        // conservative assumption.
        return 1;
    };
    let mut authors = HashSet::new();
    let Ok(mut revwalk) = repo.revwalk() else {
        return 1;
    };
    if revwalk.push_head().is_err() {
        return 1;
    }
    for oid in revwalk.flatten() {
        if let Ok(commit) = repo.find_commit(oid) {
            let author = commit.author();
            let key = author
                .email()
                .map(|e| e.to_string())
                .unwrap_or_else(|| author.name().unwrap_or("unknown").to_string());
            authors.insert(key);
        }
    }
    authors.len().max(1)
}

pub struct BusFactorMetric {
    weight: f64,
    half_point: f64,
}

impl BusFactorMetric {
    pub fn new(weight: f64, half_point: f64) -> Self {
        Self { weight, half_point }
    }
}

#[async_trait]
impl Metric for BusFactorMetric {
    fn name(&self) -> &str {
        "bus_factor"
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    async fn score(&self, tree: &DownloadedTree, _artifact: &Artifact) -> RegistryResult<MetricValue> {
        let root = tree.root().to_path_buf();
        let half_point = self.half_point;
        let contributors = tokio::task::spawn_blocking(move || count_contributors(&root))
            .await
            .map_err(|e| crate::error::RegistryError::rating(format!("bus_factor task panicked: {e}")))?;
        Ok(MetricValue::Scalar(score_large_good(half_point, contributors as f64)))
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
    async fn directory_without_git_history_scores_conservatively() {
        let dir = tempfile::tempdir().unwrap();
        let metric = BusFactorMetric::new(0.1, 4.0);
        let value = metric
            .score(&DownloadedTree::new(dir.path()), &artifact())
            .await
            .unwrap();
        // 1 assumed contributor against a half-point of 4 is well under 0.5.
        assert!(value.as_scalar() < 0.5);
    }

    #[test]
    fn score_large_good_hits_half_point() {
        assert!((score_large_good(4.0, 4.0) - 0.5).abs() < 1e-9);
    }
}
