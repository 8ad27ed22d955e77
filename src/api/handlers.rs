//! HTTP handlers for the registry's endpoint table. Each handler does the
//! minimum amount of axum-specific plumbing (parse path/query/body, pick
//! an actor) and then delegates to
//! `ArtifactAccessor`/`DeferredIngestManager`. The handlers themselves
//! carry no registry logic.

use std::collections::HashSet;
use std::time::Instant;

use axum::extract::{OriginalUri, Path, Query, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::cache_decorator::cached_read;
use super::response::{deferred_response, empty_ok, error_response, json_ok, queue_full_response};
use super::state::AppState;
use super::types::{parse_kind, ArtifactBody, CostParams, OffsetParams, QueryBody, RegexBody};
use crate::error::AccessError;
use crate::model::{Artifact, ArtifactId, Kind, RegisterRequest};

const ACTOR_HEADER: &str = "x-actor";
const DEFAULT_ACTOR: &str = "anonymous";

/// Stand-in for a pluggable authentication adapter. This crate reads the
/// caller-asserted actor off a header rather than authenticating it,
/// leaving real authentication to a deployment-specific layer in front.
fn actor_from_headers(headers: &HeaderMap) -> String {
    headers
        .get(ACTOR_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_ACTOR)
        .to_string()
}

fn query_pairs(uri: &axum::http::Uri) -> Vec<(String, String)> {
    uri.query()
        .map(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .into_owned()
                .collect()
        })
        .unwrap_or_default()
}

fn parse_kind_and_id(kind_raw: &str, id_raw: &str) -> Result<(Kind, ArtifactId), AccessError> {
    let kind = parse_kind(kind_raw)?;
    let id = ArtifactId::parse(id_raw)?;
    Ok((kind, id))
}

fn record_request(state: &AppState, route: &str, status: StatusCode, started: Instant) {
    state
        .health
        .record_request(route, status.as_u16(), started.elapsed());
}

/// `POST /artifacts?offset=N`. Body is one or more query filters, unioned
/// and deduplicated by id; the hard cap applies per page.
pub async fn post_query(
    State(state): State<AppState>,
    Query(params): Query<OffsetParams>,
    Json(body): Json<QueryBody>,
) -> Response {
    let started = Instant::now();
    let queries = body.into_vec();
    let mut combined: Vec<Artifact> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut next_offset: Option<String> = None;

    for q in &queries {
        match state.accessor.query(q, params.offset.as_deref()).await {
            Ok((page, next)) => {
                for artifact in page {
                    if seen.insert(artifact.id().as_str().to_string()) {
                        combined.push(artifact);
                    }
                }
                next_offset = next_offset.or(next);
            }
            Err(err) => {
                let resp = error_response(&err);
                record_request(&state, "/artifacts", resp.status(), started);
                return resp;
            }
        }
    }

    let mut response = json_ok(StatusCode::OK, &combined);
    if let Some(offset) = next_offset {
        if let Ok(value) = HeaderValue::from_str(&offset) {
            response
                .headers_mut()
                .insert(HeaderName::from_static("x-next-offset"), value);
        }
    }
    record_request(&state, "/artifacts", response.status(), started);
    response
}

/// `POST /artifact/byName/{name}`.
pub async fn post_by_name(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    let started = Instant::now();
    let resp = match state.accessor.get_by_name(&name).await {
        Ok(list) => json_ok(StatusCode::OK, &list),
        Err(err) => error_response(&err),
    };
    record_request(&state, "/artifact/byName/{name}", resp.status(), started);
    resp
}

/// `POST /artifact/byRegEx`.
pub async fn post_by_regex(State(state): State<AppState>, Json(body): Json<RegexBody>) -> Response {
    let started = Instant::now();
    let resp = match state.accessor.get_by_regex(&body.regex).await {
        Ok(list) => json_ok(StatusCode::OK, &list),
        Err(err) => error_response(&err),
    };
    record_request(&state, "/artifact/byRegEx", resp.status(), started);
    resp
}

/// `GET /artifacts/{kind}/{id}`. Wrapped in the caching decorator; also
/// appends a `DOWNLOAD` audit entry on a real (non-cached) read.
pub async fn get_artifact(
    State(state): State<AppState>,
    Path((kind_raw, id_raw)): Path<(String, String)>,
    headers: HeaderMap,
    OriginalUri(uri): OriginalUri,
) -> Response {
    let started = Instant::now();
    let (kind, id) = match parse_kind_and_id(&kind_raw, &id_raw) {
        Ok(v) => v,
        Err(err) => return error_response(&err),
    };
    let actor = actor_from_headers(&headers);
    let query = query_pairs(&uri);
    let resp = cached_read(&state, id.as_str(), kind.as_str(), "GET", uri.path(), &query, || async {
        state.accessor.get(kind, &id, &actor).await
    })
    .await;
    record_request(&state, "/artifacts/{kind}/{id}", resp.status(), started);
    resp
}

/// `PUT /artifacts/{kind}/{id}`. Under `ingest_asynchronous`,
/// enqueues the update and responds `202`; otherwise runs the synchronous
/// update path.
pub async fn put_artifact(
    State(state): State<AppState>,
    Path((kind_raw, id_raw)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<ArtifactBody>,
) -> Response {
    let started = Instant::now();
    let (kind, id) = match parse_kind_and_id(&kind_raw, &id_raw) {
        Ok(v) => v,
        Err(err) => return error_response(&err),
    };
    let actor = actor_from_headers(&headers);
    let request = RegisterRequest {
        url: body.url,
        name: body.name,
    };

    let resp = if state.ingest_config.ingest_asynchronous {
        match &state.deferred {
            Some(manager) if manager.submit_update(kind, id.clone(), request, actor) => deferred_response(),
            Some(_) => queue_full_response(),
            None => error_response(&AccessError::internal(
                "ingest_asynchronous is set but no deferred ingest manager is running",
            )),
        }
    } else {
        match state.accessor.update(kind, &id, request, &actor).await {
            Ok(artifact) => json_ok(StatusCode::OK, &artifact),
            Err(err) => error_response(&err),
        }
    };
    record_request(&state, "/artifacts/{kind}/{id}", resp.status(), started);
    resp
}

/// `DELETE /artifacts/{kind}/{id}`.
pub async fn delete_artifact(
    State(state): State<AppState>,
    Path((kind_raw, id_raw)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    let started = Instant::now();
    let (kind, id) = match parse_kind_and_id(&kind_raw, &id_raw) {
        Ok(v) => v,
        Err(err) => return error_response(&err),
    };
    let actor = actor_from_headers(&headers);
    let resp = match state.accessor.delete(kind, &id, &actor).await {
        Ok(()) => empty_ok(),
        Err(err) => error_response(&err),
    };
    record_request(&state, "/artifacts/{kind}/{id}", resp.status(), started);
    resp
}

/// `POST /artifact/{kind}`. Under `ingest_asynchronous`, performs the
/// cheap exists-check and either enqueues the register and responds
/// `202`, or responds `409` immediately if the id is already registered;
/// otherwise runs the synchronous register path and responds `201` on
/// success.
pub async fn post_artifact(
    State(state): State<AppState>,
    Path(kind_raw): Path<String>,
    headers: HeaderMap,
    Json(body): Json<ArtifactBody>,
) -> Response {
    let started = Instant::now();
    let kind = match parse_kind(&kind_raw) {
        Ok(k) => k,
        Err(err) => return error_response(&err),
    };
    let actor = actor_from_headers(&headers);
    let request = RegisterRequest {
        url: body.url,
        name: body.name,
    };

    let resp = if state.ingest_config.ingest_asynchronous {
        let id = ArtifactId::from_source_url(&request.url);
        match state.accessor.storage.exists(&id, kind).await {
            Ok(true) => error_response(&AccessError::already_exists(format!(
                "{kind} '{id}' already registered"
            ))),
            Ok(false) => match &state.deferred {
                Some(manager) if manager.submit_register(kind, request, actor) => deferred_response(),
                Some(_) => queue_full_response(),
                None => error_response(&AccessError::internal(
                    "ingest_asynchronous is set but no deferred ingest manager is running",
                )),
            },
            Err(err) => error_response(&AccessError::from(crate::error::RegistryError::from(err))),
        }
    } else {
        match state.accessor.register(kind, request, &actor).await {
            Ok(artifact) => {
                // `register` already wrote the rating row; re-reading it
                // here (no audit append — that's `storage`, not the
                // `derived::get_rating` accessor path) just recovers the
                // net_score for the health sink.
                let net_score = state
                    .accessor
                    .storage
                    .get_rating(artifact.id())
                    .await
                    .ok()
                    .flatten()
                    .map(|r| r.net_score)
                    .unwrap_or(0.0);
                state.health.record_ingest(kind.as_str(), true, net_score);
                json_ok(StatusCode::CREATED, &artifact)
            }
            Err(err) => {
                state.health.record_ingest(kind.as_str(), false, 0.0);
                error_response(&err)
            }
        }
    };
    record_request(&state, "/artifact/{kind}", resp.status(), started);
    resp
}

/// `GET /artifact/{kind}/{id}/cost?dependency=bool`.
pub async fn get_cost(
    State(state): State<AppState>,
    Path((kind_raw, id_raw)): Path<(String, String)>,
    Query(params): Query<CostParams>,
    OriginalUri(uri): OriginalUri,
) -> Response {
    let started = Instant::now();
    let (kind, id) = match parse_kind_and_id(&kind_raw, &id_raw) {
        Ok(v) => v,
        Err(err) => return error_response(&err),
    };
    let query = query_pairs(&uri);
    let resp = cached_read(&state, id.as_str(), kind.as_str(), "GET", uri.path(), &query, || async {
        state.accessor.cost(kind, &id, params.include_dependencies).await
    })
    .await;
    record_request(&state, "/artifact/{kind}/{id}/cost", resp.status(), started);
    resp
}

/// `GET /artifact/model/{id}/rate`.
pub async fn get_rate(
    State(state): State<AppState>,
    Path(id_raw): Path<String>,
    headers: HeaderMap,
    OriginalUri(uri): OriginalUri,
) -> Response {
    let started = Instant::now();
    let id = match ArtifactId::parse(id_raw) {
        Ok(id) => id,
        Err(err) => return error_response(&err),
    };
    let actor = actor_from_headers(&headers);
    let query = query_pairs(&uri);
    let resp = cached_read(&state, id.as_str(), "model", "GET", uri.path(), &query, || async {
        state.accessor.get_rating(&id, &actor).await
    })
    .await;
    record_request(&state, "/artifact/model/{id}/rate", resp.status(), started);
    resp
}

/// `GET /artifact/model/{id}/lineage`.
pub async fn get_lineage(
    State(state): State<AppState>,
    Path(id_raw): Path<String>,
    OriginalUri(uri): OriginalUri,
) -> Response {
    let started = Instant::now();
    let id = match ArtifactId::parse(id_raw) {
        Ok(id) => id,
        Err(err) => return error_response(&err),
    };
    let query = query_pairs(&uri);
    let resp = cached_read(&state, id.as_str(), "model", "GET", uri.path(), &query, || async {
        match state.accessor.lineage(&id).await {
            Ok(Some(graph)) => Ok(graph),
            Ok(None) => Err(AccessError::does_not_exist(format!(
                "model '{id}' does not exist"
            ))),
            Err(err) => Err(err),
        }
    })
    .await;
    record_request(&state, "/artifact/model/{id}/lineage", resp.status(), started);
    resp
}

/// `GET /artifact/{kind}/{id}/audit`.
pub async fn get_audit(
    State(state): State<AppState>,
    Path((kind_raw, id_raw)): Path<(String, String)>,
    headers: HeaderMap,
    OriginalUri(uri): OriginalUri,
) -> Response {
    let started = Instant::now();
    let (kind, id) = match parse_kind_and_id(&kind_raw, &id_raw) {
        Ok(v) => v,
        Err(err) => return error_response(&err),
    };
    let actor = actor_from_headers(&headers);
    let query = query_pairs(&uri);
    let resp = cached_read(&state, id.as_str(), kind.as_str(), "GET", uri.path(), &query, || async {
        state.accessor.get_audit(kind, &id, &actor).await
    })
    .await;
    record_request(&state, "/artifact/{kind}/{id}/audit", resp.status(), started);
    resp
}

/// `DELETE /reset`.
pub async fn delete_reset(State(state): State<AppState>) -> Response {
    let started = Instant::now();
    let resp = match state.accessor.reset().await {
        Ok(()) => empty_ok(),
        Err(err) => error_response(&err),
    };
    record_request(&state, "/reset", resp.status(), started);
    resp
}

/// Liveness probe, the kind of thing every service binary exposes
/// alongside its real routes.
pub async fn healthz() -> impl IntoResponse {
    StatusCode::OK
}
