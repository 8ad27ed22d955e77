//! Rating records produced by the metric aggregator.

use serde::{Deserialize, Serialize};

use super::ArtifactId;

/// One metric's contribution to a rating: its name, how long it took, its
/// raw normalized score in `[0,1]`, and that score weighted by the metric's
/// static weight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricResult {
    pub name: String,
    pub latency_seconds: f64,
    pub raw_score: f64,
    pub weighted_score: f64,
}

/// The structured per-deployment-target size score. Reduces to its
/// arithmetic mean when folded into the scalar `MetricResult` the
/// aggregator emits.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DeploymentTargetScores {
    pub rpi: f64,
    pub jetson: f64,
    pub desktop: f64,
    pub aws: f64,
}

impl DeploymentTargetScores {
    pub fn mean(self) -> f64 {
        (self.rpi + self.jetson + self.desktop + self.aws) / 4.0
    }
}

/// The aggregated rating for a model, written only after ingest admission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rating {
    pub model_id: ArtifactId,
    pub metrics: Vec<MetricResult>,
    pub net_score: f64,
    /// Present only if the size metric ran; kept alongside the folded
    /// scalar in `metrics` for callers that want the per-target breakdown.
    pub size_breakdown: Option<DeploymentTargetScores>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deployment_target_mean() {
        let scores = DeploymentTargetScores {
            rpi: 0.2,
            jetson: 0.4,
            desktop: 0.8,
            aws: 1.0,
        };
        assert!((scores.mean() - 0.6).abs() < 1e-9);
    }
}
