//! The cost traversal's output shape.

use serde::{Deserialize, Serialize};

/// `{standalone, total}` size in megabytes for one artifact's cost query.
/// `standalone` is always the artifact's own `size_mb`; `total` additionally
/// folds in ancestor and dependency sizes when the caller asked for
/// `include_dependencies = true` on a model.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CostBreakdown {
    pub standalone_cost: f64,
    pub total_cost: f64,
    /// Set when the ancestor walk hit the maximum depth bound before
    /// exhausting the parent chain.
    #[serde(default)]
    pub truncated: bool,
}
