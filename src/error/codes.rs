//! Error code registry for the registry service
//!
//! Error codes are organized by category:
//! - 1000-1999: Configuration errors
//! - 2000-2999: Storage (metadata store) errors
//! - 3000-3999: Object store errors
//! - 4000-4999: Download errors
//! - 5000-5999: Rating / metric errors
//! - 6000-6999: Cache errors
//! - 7000-7999: Ingest queue errors
//! - 8000-8999: Audit log errors
#[allow(dead_code)]
pub struct ErrorCode;

impl ErrorCode {
    pub const CONFIG_GENERIC: u16 = 1000;
    pub const CONFIG_MISSING_REQUIRED: u16 = 1001;
    pub const CONFIG_INVALID_VALUE: u16 = 1002;

    pub const STORAGE_GENERIC: u16 = 2000;
    pub const STORAGE_NOT_FOUND: u16 = 2001;
    pub const STORAGE_ALREADY_EXISTS: u16 = 2002;
    pub const STORAGE_CONNECTION: u16 = 2003;
    pub const STORAGE_TRANSACTION: u16 = 2004;

    pub const OBJECT_GENERIC: u16 = 3000;
    pub const OBJECT_NOT_FOUND: u16 = 3001;
    pub const OBJECT_TRANSIENT: u16 = 3002;

    pub const DOWNLOAD_GENERIC: u16 = 4000;
    pub const DOWNLOAD_NOT_FOUND: u16 = 4001;
    pub const DOWNLOAD_UNSUPPORTED_KIND: u16 = 4002;
    pub const DOWNLOAD_TRANSIENT: u16 = 4003;

    pub const RATING_GENERIC: u16 = 5000;
    pub const RATING_OUT_OF_RANGE: u16 = 5001;

    pub const CACHE_GENERIC: u16 = 6000;

    pub const INGEST_QUEUE_FULL: u16 = 7000;

    pub const AUDIT_GENERIC: u16 = 8000;
}

/// Human description of an error code, used for developer-facing diagnostics.
pub fn describe_error_code(code: u16) -> &'static str {
    match code {
        ErrorCode::CONFIG_GENERIC => "generic configuration error",
        ErrorCode::CONFIG_MISSING_REQUIRED => "missing required configuration value",
        ErrorCode::CONFIG_INVALID_VALUE => "invalid configuration value",
        ErrorCode::STORAGE_GENERIC => "generic metadata store error",
        ErrorCode::STORAGE_NOT_FOUND => "metadata row not found",
        ErrorCode::STORAGE_ALREADY_EXISTS => "metadata row already exists",
        ErrorCode::STORAGE_CONNECTION => "metadata store connection failure",
        ErrorCode::STORAGE_TRANSACTION => "metadata store transaction failure",
        ErrorCode::OBJECT_GENERIC => "generic object store error",
        ErrorCode::OBJECT_NOT_FOUND => "object not found",
        ErrorCode::OBJECT_TRANSIENT => "transient object store failure",
        ErrorCode::DOWNLOAD_GENERIC => "generic downloader error",
        ErrorCode::DOWNLOAD_NOT_FOUND => "source artifact not found",
        ErrorCode::DOWNLOAD_UNSUPPORTED_KIND => "unsupported artifact kind for origin",
        ErrorCode::DOWNLOAD_TRANSIENT => "transient download failure",
        ErrorCode::RATING_GENERIC => "generic rating error",
        ErrorCode::RATING_OUT_OF_RANGE => "metric score out of [0,1] range",
        ErrorCode::CACHE_GENERIC => "generic cache error",
        ErrorCode::INGEST_QUEUE_FULL => "deferred ingest queue at capacity",
        ErrorCode::AUDIT_GENERIC => "generic audit log error",
        _ => "unclassified error",
    }
}
