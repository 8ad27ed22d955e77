//! The artifact accessor's own tunables: paging hard cap, presigned URL
//! lifetime, and ancestor-walk depth bound.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessorConfig {
    /// Size of one page returned by `query`/`get_by_query`.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Hard cap a single page must never exceed; `query` returns
    /// `TOO_MANY_ARTIFACTS` rather than a page larger than this. Applied
    /// per page, not to the whole matching set.
    #[serde(default = "default_hard_cap")]
    pub hard_cap: usize,
    /// Lifetime of a presigned download URL minted by `get`.
    #[serde(with = "humantime_serde", default = "default_download_url_ttl")]
    pub download_url_ttl: Duration,
    /// Maximum number of parent-model hops `cost`/`lineage` will walk
    /// before reporting `truncated = true`.
    #[serde(default = "default_max_lineage_depth")]
    pub max_lineage_depth: usize,
}

fn default_page_size() -> usize {
    50
}

fn default_hard_cap() -> usize {
    100
}

fn default_download_url_ttl() -> Duration {
    Duration::from_secs(3600)
}

fn default_max_lineage_depth() -> usize {
    64
}

impl Default for AccessorConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            hard_cap: default_hard_cap(),
            download_url_ttl: default_download_url_ttl(),
            max_lineage_depth: default_max_lineage_depth(),
        }
    }
}
