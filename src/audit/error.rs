//! Error type for the audit log.

use thiserror::Error;

pub type AuditResult<T> = Result<T, AuditError>;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("audit backend error: {0}")]
    Backend(String),

    #[error("audit configuration error: {0}")]
    Configuration(String),
}

impl From<AuditError> for crate::error::RegistryError {
    fn from(err: AuditError) -> Self {
        crate::error::RegistryError::audit(err.to_string())
    }
}
