//! Audit log configuration.

use serde::{Deserialize, Serialize};

use super::BackendType;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// When false, `append` is a no-op and `get_by_artifact` always
    /// returns `None`. Audit failures are logged and never abort the
    /// user-facing operation; disabling audit entirely is the degenerate
    /// case of that same tolerance.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub backend: BackendType,
}

fn default_enabled() -> bool {
    true
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            backend: BackendType::default(),
        }
    }
}
