//! Runs every configured metric in parallel over a downloaded tree and
//! folds the results into one `Rating`.

use std::sync::Arc;
use std::time::Instant;

use crate::model::{Artifact, DeploymentTargetScores, MetricResult, Rating};

use super::traits::{in_range, DownloadedTree, Metric, MetricValue};

pub struct RatingAggregator {
    metrics: Vec<Arc<dyn Metric>>,
}

impl RatingAggregator {
    pub fn new(metrics: Vec<Arc<dyn Metric>>) -> Self {
        Self { metrics }
    }

    /// Runs every metric as an independent task. Ordering of completion
    /// never affects the result: each task's contribution is reduced to
    /// `(name, latency, raw, weighted)` before being folded in, and the
    /// fold is a commutative sum.
    pub async fn run(&self, tree: &DownloadedTree, artifact: &Artifact) -> Rating {
        let tasks = self.metrics.iter().cloned().map(|metric| {
            let tree = tree.clone();
            let artifact = artifact.clone();
            tokio::spawn(async move { run_one(metric, &tree, &artifact).await })
        });

        let outcomes = futures::future::join_all(tasks).await;

        let mut metric_results = Vec::with_capacity(outcomes.len());
        let mut size_breakdown: Option<DeploymentTargetScores> = None;
        let mut weighted_sum = 0.0;
        let mut weight_of_succeeded = 0.0;

        for (metric, outcome) in self.metrics.iter().zip(outcomes) {
            let outcome = outcome.unwrap_or_else(|_join_err| {
                // A metric task panicking is equivalent to it raising: its
                // contribution is zero and its latency is recorded.
                tracing::error!(metric = %metric.name(), "metric task panicked; contribution is zero");
                RunOutcome {
                    result: MetricResult {
                        name: metric.name().to_string(),
                        latency_seconds: 0.0,
                        raw_score: 0.0,
                        weighted_score: 0.0,
                    },
                    succeeded: false,
                    size_breakdown: None,
                }
            });

            if outcome.succeeded {
                weighted_sum += outcome.result.weighted_score;
                weight_of_succeeded += metric.weight();
                if outcome.size_breakdown.is_some() {
                    size_breakdown = outcome.size_breakdown;
                }
            }
            metric_results.push(outcome.result);
        }

        let net_score = if weight_of_succeeded > 0.0 {
            (weighted_sum / weight_of_succeeded).clamp(0.0, 1.0)
        } else {
            0.0
        };

        Rating {
            model_id: artifact.id().clone(),
            metrics: metric_results,
            net_score,
            size_breakdown,
        }
    }
}

struct RunOutcome {
    result: MetricResult,
    succeeded: bool,
    size_breakdown: Option<DeploymentTargetScores>,
}

async fn run_one(metric: Arc<dyn Metric>, tree: &DownloadedTree, artifact: &Artifact) -> RunOutcome {
    let start = Instant::now();
    let name = metric.name().to_string();
    let weight = metric.weight();

    match metric.score(tree, artifact).await {
        Ok(value) if in_range(&value) => {
            let latency = start.elapsed().as_secs_f64();
            let raw = value.as_scalar();
            RunOutcome {
                result: MetricResult {
                    name,
                    latency_seconds: latency,
                    raw_score: raw,
                    weighted_score: weight * raw,
                },
                succeeded: true,
                size_breakdown: value.size_breakdown(),
            }
        }
        Ok(_out_of_range) => {
            // MetricOutOfRange: contribution is zero, but
            // this is a bug, not a transient failure, so it's logged loudly.
            tracing::error!(metric = %name, "metric returned a score outside [0,1]; MetricOutOfRange");
            RunOutcome {
                result: MetricResult {
                    name,
                    latency_seconds: start.elapsed().as_secs_f64(),
                    raw_score: 0.0,
                    weighted_score: 0.0,
                },
                succeeded: false,
                size_breakdown: None,
            }
        }
        Err(err) => {
            tracing::warn!(metric = %name, error = %err, "metric failed; contribution is zero");
            RunOutcome {
                result: MetricResult {
                    name,
                    latency_seconds: start.elapsed().as_secs_f64(),
                    raw_score: 0.0,
                    weighted_score: 0.0,
                },
                succeeded: false,
                size_breakdown: None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Artifact, ArtifactId, Kind};

    struct ConstantMetric {
        name: &'static str,
        weight: f64,
        value: f64,
    }

    #[async_trait::async_trait]
    impl Metric for ConstantMetric {
        fn name(&self) -> &str {
            self.name
        }
        fn weight(&self) -> f64 {
            self.weight
        }
        async fn score(
            &self,
            _tree: &DownloadedTree,
            _artifact: &Artifact,
        ) -> crate::error::RegistryResult<MetricValue> {
            Ok(MetricValue::Scalar(self.value))
        }
    }

    struct FailingMetric;

    #[async_trait::async_trait]
    impl Metric for FailingMetric {
        fn name(&self) -> &str {
            "always_fails"
        }
        fn weight(&self) -> f64 {
            0.5
        }
        async fn score(
            &self,
            _tree: &DownloadedTree,
            _artifact: &Artifact,
        ) -> crate::error::RegistryResult<MetricValue> {
            Err(crate::error::RegistryError::rating("boom"))
        }
    }

    struct OutOfRangeMetric;

    #[async_trait::async_trait]
    impl Metric for OutOfRangeMetric {
        fn name(&self) -> &str {
            "broken"
        }
        fn weight(&self) -> f64 {
            1.0
        }
        async fn score(
            &self,
            _tree: &DownloadedTree,
            _artifact: &Artifact,
        ) -> crate::error::RegistryResult<MetricValue> {
            Ok(MetricValue::Scalar(1.5))
        }
    }

    fn artifact() -> Artifact {
        Artifact::new(
            ArtifactId::from_source_url("https://huggingface.co/bert"),
            "bert".to_string(),
            Kind::Model,
            "https://huggingface.co/bert".to_string(),
            10.0,
        )
    }

    #[tokio::test]
    async fn net_score_is_weighted_mean_of_succeeding_metrics() {
        let aggregator = RatingAggregator::new(vec![
            Arc::new(ConstantMetric { name: "a", weight: 1.0, value: 1.0 }),
            Arc::new(ConstantMetric { name: "b", weight: 1.0, value: 0.0 }),
        ]);
        let tree = DownloadedTree::new("/tmp");
        let rating = aggregator.run(&tree, &artifact()).await;
        assert!((rating.net_score - 0.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn all_metrics_failing_yields_zero_net_score() {
        let aggregator = RatingAggregator::new(vec![Arc::new(FailingMetric)]);
        let tree = DownloadedTree::new("/tmp");
        let rating = aggregator.run(&tree, &artifact()).await;
        assert_eq!(rating.net_score, 0.0);
    }

    #[tokio::test]
    async fn failing_metric_does_not_drag_down_succeeding_metrics() {
        let aggregator = RatingAggregator::new(vec![
            Arc::new(ConstantMetric { name: "a", weight: 1.0, value: 1.0 }),
            Arc::new(FailingMetric),
        ]);
        let tree = DownloadedTree::new("/tmp");
        let rating = aggregator.run(&tree, &artifact()).await;
        assert!((rating.net_score - 1.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn out_of_range_score_contributes_zero() {
        let aggregator = RatingAggregator::new(vec![Arc::new(OutOfRangeMetric)]);
        let tree = DownloadedTree::new("/tmp");
        let rating = aggregator.run(&tree, &artifact()).await;
        assert_eq!(rating.net_score, 0.0);
        assert_eq!(rating.metrics[0].raw_score, 0.0);
    }
}
