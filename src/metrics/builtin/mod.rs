//! Built-in metric implementations.

pub mod bus_factor;
pub mod code_quality;
pub mod dataset_quality;
pub mod license;
pub mod ramp_up;
pub mod size;

pub use bus_factor::BusFactorMetric;
pub use code_quality::CodeQualityMetric;
pub use dataset_quality::DatasetQualityMetric;
pub use license::LicenseMetric;
pub use ramp_up::RampUpMetric;
pub use size::{SizeMetric, SizeThresholds};
