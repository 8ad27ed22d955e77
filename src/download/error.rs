//! Error type for the downloader interface.

use thiserror::Error;

pub type DownloadResult<T> = Result<T, DownloadError>;

#[derive(Error, Debug)]
pub enum DownloadError {
    /// Unreachable or non-existent repository. The accessor
    /// maps this to `BAD_REQUEST`.
    #[error("artifact not found at {0}")]
    NotFound(String),

    /// Type/origin mismatch, e.g. a GitHub URL handed to the model
    /// downloader. Maps to `BAD_REQUEST` alongside `NotFound`.
    #[error("unsupported kind for this origin: {0}")]
    UnsupportedKind(String),

    /// IO/network error. The accessor maps this to `DISQUALIFIED`.
    #[error("transient download failure: {0}")]
    Transient(String),
}

impl From<DownloadError> for crate::error::RegistryError {
    fn from(err: DownloadError) -> Self {
        match &err {
            DownloadError::NotFound(msg) => crate::error::RegistryError::Download {
                code: crate::error::ErrorCode::DOWNLOAD_NOT_FOUND,
                message: msg.clone(),
                source: None,
            },
            DownloadError::UnsupportedKind(msg) => crate::error::RegistryError::Download {
                code: crate::error::ErrorCode::DOWNLOAD_UNSUPPORTED_KIND,
                message: msg.clone(),
                source: None,
            },
            DownloadError::Transient(_) => crate::error::RegistryError::Download {
                code: crate::error::ErrorCode::DOWNLOAD_TRANSIENT,
                message: err.to_string(),
                source: None,
            },
        }
    }
}
