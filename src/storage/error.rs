//! Error type for the metadata store.

use thiserror::Error;

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("transaction error: {0}")]
    Transaction(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("backend error: {0}")]
    Backend(String),
}

impl StorageError {
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }
}

impl From<StorageError> for crate::error::RegistryError {
    fn from(err: StorageError) -> Self {
        match &err {
            StorageError::NotFound(msg) => crate::error::RegistryError::Storage {
                code: crate::error::ErrorCode::STORAGE_NOT_FOUND,
                message: msg.clone(),
                source: None,
            },
            StorageError::AlreadyExists(msg) => crate::error::RegistryError::Storage {
                code: crate::error::ErrorCode::STORAGE_ALREADY_EXISTS,
                message: msg.clone(),
                source: None,
            },
            StorageError::Connection(_) => crate::error::RegistryError::Storage {
                code: crate::error::ErrorCode::STORAGE_CONNECTION,
                message: err.to_string(),
                source: None,
            },
            StorageError::Transaction(_) => crate::error::RegistryError::Storage {
                code: crate::error::ErrorCode::STORAGE_TRANSACTION,
                message: err.to_string(),
                source: None,
            },
            _ => crate::error::RegistryError::storage(err.to_string()),
        }
    }
}
