//! The metric contract: a stable name, a static weight, and
//! a pure scoring function over a downloaded tree.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::error::RegistryResult;
use crate::model::{Artifact, DeploymentTargetScores};

/// The downloaded artifact tree a metric scores. Just a scratch directory
/// handle; metrics read whatever files they need from it.
#[derive(Debug, Clone)]
pub struct DownloadedTree {
    root: PathBuf,
}

impl DownloadedTree {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// What a metric hands back before the aggregator folds it into a scalar
/// `raw_score`. Most metrics are already scalar; the size metric instead
/// reports a structured per-deployment-target breakdown.
#[derive(Debug, Clone)]
pub enum MetricValue {
    Scalar(f64),
    Size(DeploymentTargetScores),
}

impl MetricValue {
    /// Folds a structured value into the scalar the aggregator weights.
    pub fn as_scalar(&self) -> f64 {
        match self {
            Self::Scalar(v) => *v,
            Self::Size(scores) => scores.mean(),
        }
    }

    pub fn size_breakdown(&self) -> Option<DeploymentTargetScores> {
        match self {
            Self::Size(scores) => Some(*scores),
            Self::Scalar(_) => None,
        }
    }
}

/// A metric contract instance. `score` must be pure given identical
/// `tree`/`artifact` inputs and must return a value in `[0,1]`
/// (`[0,1]`-per-dimension for `MetricValue::Size`); a violation is a bug
/// the aggregator treats as `MetricOutOfRange`.
#[async_trait]
pub trait Metric: Send + Sync {
    fn name(&self) -> &str;

    fn weight(&self) -> f64;

    async fn score(&self, tree: &DownloadedTree, artifact: &Artifact) -> RegistryResult<MetricValue>;
}

/// Checks a metric's raw value is in range, per dimension for `Size`.
pub fn in_range(value: &MetricValue) -> bool {
    let in_unit = |v: f64| (0.0..=1.0).contains(&v);
    match value {
        MetricValue::Scalar(v) => in_unit(*v),
        MetricValue::Size(s) => in_unit(s.rpi) && in_unit(s.jetson) && in_unit(s.desktop) && in_unit(s.aws),
    }
}
