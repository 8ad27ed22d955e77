//! # Registry Error System
//!
//! Two error types live here, at different altitudes:
//!
//! - [`RegistryError`] is the internal, subsystem-shaped error used by the
//!   storage, object store, downloader, rating, and cache layers. It carries
//!   a structured error code (see [`codes`]) and an optional source error.
//! - [`AccessError`] is the outward-facing status taxonomy
//!   (`ALREADY_EXISTS`, `DOES_NOT_EXIST`, `DISQUALIFIED`, ...). The artifact
//!   accessor (`crate::accessor`) is the only place that produces it; it is
//!   built by collapsing one or more `RegistryError`s according to the
//!   mapping rules in each accessor operation's doc comment.
//!
//! Component-level failures are always values, never panics: every fallible
//! operation in this crate returns a `Result`.

use std::fmt;
use thiserror::Error;

pub mod codes;
pub mod serialization;

pub use codes::{describe_error_code, ErrorCode};
pub use serialization::SerializableError;

/// Result type used throughout the storage/object-store/download/rating/cache layers.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Unified internal error type for the registry's subsystems.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("[E{code:04}] configuration error: {message}")]
    Config {
        code: u16,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("[E{code:04}] metadata store error: {message}")]
    Storage {
        code: u16,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("[E{code:04}] object store error: {message}")]
    Object {
        code: u16,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("[E{code:04}] downloader error: {message}")]
    Download {
        code: u16,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("[E{code:04}] rating error: {message}")]
    Rating {
        code: u16,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("[E{code:04}] cache error: {message}")]
    Cache {
        code: u16,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("[E{code:04}] ingest queue error: {message}")]
    Ingest {
        code: u16,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("[E{code:04}] audit log error: {message}")]
    Audit {
        code: u16,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RegistryError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            code: ErrorCode::CONFIG_GENERIC,
            message: message.into(),
            source: None,
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            code: ErrorCode::STORAGE_GENERIC,
            message: message.into(),
            source: None,
        }
    }

    pub fn storage_not_found(message: impl Into<String>) -> Self {
        Self::Storage {
            code: ErrorCode::STORAGE_NOT_FOUND,
            message: message.into(),
            source: None,
        }
    }

    pub fn object(message: impl Into<String>) -> Self {
        Self::Object {
            code: ErrorCode::OBJECT_GENERIC,
            message: message.into(),
            source: None,
        }
    }

    pub fn download(message: impl Into<String>) -> Self {
        Self::Download {
            code: ErrorCode::DOWNLOAD_GENERIC,
            message: message.into(),
            source: None,
        }
    }

    pub fn rating(message: impl Into<String>) -> Self {
        Self::Rating {
            code: ErrorCode::RATING_GENERIC,
            message: message.into(),
            source: None,
        }
    }

    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache {
            code: ErrorCode::CACHE_GENERIC,
            message: message.into(),
            source: None,
        }
    }

    pub fn audit(message: impl Into<String>) -> Self {
        Self::Audit {
            code: ErrorCode::AUDIT_GENERIC,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, err: E) -> Self {
        let boxed: Box<dyn std::error::Error + Send + Sync> = Box::new(err);
        match &mut self {
            Self::Config { source, .. }
            | Self::Storage { source, .. }
            | Self::Object { source, .. }
            | Self::Download { source, .. }
            | Self::Rating { source, .. }
            | Self::Cache { source, .. }
            | Self::Ingest { source, .. }
            | Self::Audit { source, .. } => *source = Some(boxed),
            Self::Other(_) => {}
        }
        self
    }

    /// Structured error code, used for logs and `SerializableError`.
    pub fn code(&self) -> u16 {
        match self {
            Self::Config { code, .. }
            | Self::Storage { code, .. }
            | Self::Object { code, .. }
            | Self::Download { code, .. }
            | Self::Rating { code, .. }
            | Self::Cache { code, .. }
            | Self::Ingest { code, .. }
            | Self::Audit { code, .. } => *code,
            Self::Other(_) => 9999,
        }
    }
}

/// The outward-facing operation status taxonomy.
///
/// Every public accessor operation (`crate::accessor::ArtifactAccessor`)
/// returns `Result<T, AccessError>`, where `AccessError::status` is one of
/// these variants and maps 1:1 onto an HTTP status code in `crate::api`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessStatus {
    Success,
    AlreadyExists,
    DoesNotExist,
    BadRequest,
    Disqualified,
    TooManyArtifacts,
    Deferred,
    InternalError,
}

impl AccessStatus {
    /// The HTTP status code this access status maps to.
    pub fn http_status(self) -> u16 {
        match self {
            Self::Success => 200,
            Self::AlreadyExists => 409,
            Self::DoesNotExist => 404,
            Self::BadRequest => 400,
            Self::Disqualified => 424,
            Self::TooManyArtifacts => 413,
            Self::Deferred => 202,
            Self::InternalError => 500,
        }
    }
}

impl fmt::Display for AccessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Success => "SUCCESS",
            Self::AlreadyExists => "ALREADY_EXISTS",
            Self::DoesNotExist => "DOES_NOT_EXIST",
            Self::BadRequest => "BAD_REQUEST",
            Self::Disqualified => "DISQUALIFIED",
            Self::TooManyArtifacts => "TOO_MANY_ARTIFACTS",
            Self::Deferred => "DEFERRED",
            Self::InternalError => "INTERNAL_ERROR",
        };
        f.write_str(s)
    }
}

/// An accessor-level failure: an `AccessStatus` plus a human-readable
/// message. `Success`/`Deferred` are never carried as an
/// `Err` — accessor methods return `Ok` for those and use `AccessError`
/// only for the failure statuses.
#[derive(Error, Debug, Clone)]
#[error("{status}: {message}")]
pub struct AccessError {
    pub status: AccessStatus,
    pub message: String,
}

impl AccessError {
    pub fn new(status: AccessStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn already_exists(message: impl Into<String>) -> Self {
        Self::new(AccessStatus::AlreadyExists, message)
    }

    pub fn does_not_exist(message: impl Into<String>) -> Self {
        Self::new(AccessStatus::DoesNotExist, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(AccessStatus::BadRequest, message)
    }

    pub fn disqualified(message: impl Into<String>) -> Self {
        Self::new(AccessStatus::Disqualified, message)
    }

    pub fn too_many_artifacts(message: impl Into<String>) -> Self {
        Self::new(AccessStatus::TooManyArtifacts, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(AccessStatus::InternalError, message)
    }
}

/// Maps a lower-layer `RegistryError` onto the accessor's taxonomy.
/// Storage/object/cache failures that aren't expected domain outcomes
/// (not-found, already-exists) collapse to `INTERNAL_ERROR`; the accessor
/// is expected to have already handled the expected outcomes explicitly
/// before falling back to this conversion.
impl From<RegistryError> for AccessError {
    fn from(err: RegistryError) -> Self {
        let message = err.to_string();
        match &err {
            RegistryError::Storage { code, .. } if *code == ErrorCode::STORAGE_NOT_FOUND => {
                AccessError::does_not_exist(message)
            }
            RegistryError::Storage { code, .. } if *code == ErrorCode::STORAGE_ALREADY_EXISTS => {
                AccessError::already_exists(message)
            }
            _ => AccessError::internal(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_status_http_mapping_matches_spec() {
        assert_eq!(AccessStatus::Success.http_status(), 200);
        assert_eq!(AccessStatus::AlreadyExists.http_status(), 409);
        assert_eq!(AccessStatus::DoesNotExist.http_status(), 404);
        assert_eq!(AccessStatus::BadRequest.http_status(), 400);
        assert_eq!(AccessStatus::Disqualified.http_status(), 424);
        assert_eq!(AccessStatus::TooManyArtifacts.http_status(), 413);
        assert_eq!(AccessStatus::Deferred.http_status(), 202);
        assert_eq!(AccessStatus::InternalError.http_status(), 500);
    }

    #[test]
    fn storage_not_found_collapses_to_does_not_exist() {
        let err = RegistryError::storage_not_found("no such row");
        let access: AccessError = err.into();
        assert_eq!(access.status, AccessStatus::DoesNotExist);
    }
}
