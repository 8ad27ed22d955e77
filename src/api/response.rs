//! Shared response-building helpers: turning an `AccessError` or a
//! pre-serialized body into an axum [`Response`] with the right status
//! code` mapping).

use axum::body::Body;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::api::types::ErrorBody;
use crate::error::AccessError;

pub fn json_bytes(status: StatusCode, bytes: Vec<u8>) -> Response {
    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(bytes))
        .expect("status and content-type header are always valid")
}

pub fn json_ok<T: serde::Serialize>(status: StatusCode, value: &T) -> Response {
    match serde_json::to_vec(value) {
        Ok(bytes) => json_bytes(status, bytes),
        Err(err) => error_response(&AccessError::internal(format!("serializing response body: {err}"))),
    }
}

pub fn error_response(err: &AccessError) -> Response {
    let status = StatusCode::from_u16(err.status.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = ErrorBody::from(err);
    json_ok(status, &body)
}

/// `202 Accepted` for `register`/`update` requests handed off to the
/// deferred ingest queue.
pub fn deferred_response() -> Response {
    let body = crate::api::types::DeferredBody {
        status: "DEFERRED",
        message: "accepted to the ingest queue; no terminal result yet".to_string(),
    };
    json_ok(StatusCode::ACCEPTED, &body)
}

/// The queue was full: backpressure surfaced to the caller as `503`
/// —
/// backpressure to the caller, which surfaces as an HTTP 503 ... per
/// deployment policy").
pub fn queue_full_response() -> Response {
    let body = crate::api::types::DeferredBody {
        status: "UNAVAILABLE",
        message: "deferred ingest queue is full; retry later".to_string(),
    };
    json_ok(StatusCode::SERVICE_UNAVAILABLE, &body)
}

pub fn empty_ok() -> Response {
    StatusCode::OK.into_response()
}
