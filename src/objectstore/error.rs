//! Error type for the object store adapter.

use thiserror::Error;

pub type ObjectResult<T> = Result<T, ObjectError>;

#[derive(Error, Debug)]
pub enum ObjectError {
    #[error("object not found: {0}")]
    NotFound(String),

    /// Anything retryable: network blip, throttling, a backend outage.
    #[error("transient object store failure: {0}")]
    Transient(String),

    #[error("object store configuration error: {0}")]
    Configuration(String),
}

impl From<ObjectError> for crate::error::RegistryError {
    fn from(err: ObjectError) -> Self {
        match &err {
            ObjectError::NotFound(msg) => crate::error::RegistryError::Object {
                code: crate::error::ErrorCode::OBJECT_NOT_FOUND,
                message: msg.clone(),
                source: None,
            },
            ObjectError::Transient(_) => crate::error::RegistryError::Object {
                code: crate::error::ErrorCode::OBJECT_TRANSIENT,
                message: err.to_string(),
                source: None,
            },
            ObjectError::Configuration(msg) => crate::error::RegistryError::Object {
                code: crate::error::ErrorCode::OBJECT_GENERIC,
                message: msg.clone(),
                source: None,
            },
        }
    }
}
