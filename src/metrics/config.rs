//! Rating pipeline configuration: `rater_workers`,
//! `rater_processes_per_job`, `ingest_threshold`.

use serde::{Deserialize, Serialize};

use super::builtin::SizeThresholds;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaterConfig {
    /// Net score admission gate.
    #[serde(default = "default_threshold")]
    pub ingest_threshold: f64,
    /// Worker pool size for the deferred ingest manager's raters.
    #[serde(default = "default_workers")]
    pub rater_workers: usize,
    /// Per-job rating sub-pool size: each job spins its own rating pool
    /// of up to this many workers.
    #[serde(default = "default_processes_per_job")]
    pub rater_processes_per_job: usize,
    #[serde(default)]
    pub size_thresholds: SizeThresholds,
    #[serde(default = "default_bus_factor_half_point")]
    pub bus_factor_half_point: f64,
}

fn default_threshold() -> f64 {
    0.5
}

fn default_workers() -> usize {
    4
}

fn default_processes_per_job() -> usize {
    1
}

fn default_bus_factor_half_point() -> f64 {
    4.0
}

impl Default for RaterConfig {
    fn default() -> Self {
        Self {
            ingest_threshold: default_threshold(),
            rater_workers: default_workers(),
            rater_processes_per_job: default_processes_per_job(),
            size_thresholds: SizeThresholds::default(),
            bus_factor_half_point: default_bus_factor_half_point(),
        }
    }
}
