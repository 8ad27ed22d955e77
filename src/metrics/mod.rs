//! The metric contract and rating aggregator.

pub mod aggregator;
pub mod builtin;
pub mod config;
pub mod traits;

pub use aggregator::RatingAggregator;
pub use config::RaterConfig;
pub use traits::{DownloadedTree, Metric, MetricValue};

use std::sync::Arc;

/// The default metric set every ingest runs: size plus the heuristic
/// quality metrics. Weights sum to 1.0 so `net_score` is already on
/// `[0,1]` when every metric succeeds.
pub fn default_metrics(config: &RaterConfig) -> Vec<Arc<dyn Metric>> {
    vec![
        Arc::new(builtin::SizeMetric::new(0.2, config.size_thresholds)),
        Arc::new(builtin::LicenseMetric::new(0.2)),
        Arc::new(builtin::RampUpMetric::new(0.2)),
        Arc::new(builtin::BusFactorMetric::new(0.15, config.bus_factor_half_point)),
        Arc::new(builtin::CodeQualityMetric::new(0.15)),
        Arc::new(builtin::DatasetQualityMetric::new(0.1)),
    ]
}
