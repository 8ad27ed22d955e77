//! The response cache's decorator contract: read handlers are wrapped so
//! that a fingerprint hit short-circuits the handler entirely, and a miss
//! stores the handler's serialized result under that fingerprint's key.
//!
//! Mutating handlers don't go through this decorator. The accessor
//! already invalidates `(artifact_id, kind, *)` itself before
//! `register`/`update`/`delete` return, so cache invalidation always
//! happens before the mutation returns to the client.

use std::future::Future;

use axum::http::StatusCode;
use axum::response::Response;
use serde::Serialize;

use super::response::{error_response, json_bytes};
use super::state::AppState;
use crate::cache::{cache_key, fingerprint};
use crate::error::AccessError;

/// Wraps a read handler with the fingerprint cache. `query` must already be
/// sorted-or-not — `fingerprint` sorts it internally — and `body` is empty
/// for every GET route this crate exposes.
pub async fn cached_read<T, F, Fut>(
    state: &AppState,
    artifact_id: &str,
    kind: &str,
    method: &str,
    path: &str,
    query: &[(String, String)],
    handler: F,
) -> Response
where
    T: Serialize,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, AccessError>>,
{
    let fp = fingerprint(method, path, query, b"");
    let key = cache_key(artifact_id, kind, &fp);

    // A cache failure degrades to a miss; it never surfaces to the client.
    if let Ok(Some(cached_body)) = state.accessor.cache.get(&key).await {
        return json_bytes(StatusCode::OK, cached_body);
    }

    match handler().await {
        Ok(value) => {
            let bytes = match serde_json::to_vec(&value) {
                Ok(bytes) => bytes,
                Err(err) => {
                    return error_response(&AccessError::internal(format!(
                        "serializing response body: {err}"
                    )))
                }
            };
            if let Err(err) = state.accessor.cache.insert(&key, bytes.clone()).await {
                tracing::warn!(key = %key, error = %err, "cache insert failed (degrading silently)");
            }
            json_bytes(StatusCode::OK, bytes)
        }
        Err(err) => error_response(&err),
    }
}
