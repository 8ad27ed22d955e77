//! Serializable error representation for JSON API responses and logging.

use super::{AccessError, AccessStatus, RegistryError};
use serde::{Deserialize, Serialize};

/// JSON-serializable error body, returned by the HTTP API on failure and
/// used by `tracing` spans when logging a failed operation.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SerializableError {
    /// Machine status code from the accessor's status taxonomy (e.g. `"DISQUALIFIED"`).
    pub status: String,
    /// Human-readable message.
    pub message: String,
    /// Internal error code, present only for lower-layer errors that were
    /// never classified into the accessor taxonomy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
}

impl From<&AccessError> for SerializableError {
    fn from(err: &AccessError) -> Self {
        Self {
            status: err.status.to_string(),
            message: err.message.clone(),
            code: None,
        }
    }
}

impl From<&RegistryError> for SerializableError {
    fn from(err: &RegistryError) -> Self {
        Self {
            status: AccessStatus::InternalError.to_string(),
            message: err.to_string(),
            code: Some(err.code()),
        }
    }
}
