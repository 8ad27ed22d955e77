//! Router assembly for the registry's endpoint table: routing glue binding
//! each path to its handler plus the cross-cutting layers (tracing,
//! request id propagation, CORS).

use axum::http::HeaderName;
use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use super::handlers;
use super::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let request_id_header = HeaderName::from_static("x-request-id");

    Router::new()
        .route("/artifacts", post(handlers::post_query))
        .route("/artifact/byName/{name}", post(handlers::post_by_name))
        .route("/artifact/byRegEx", post(handlers::post_by_regex))
        .route(
            "/artifacts/{kind}/{id}",
            get(handlers::get_artifact)
                .put(handlers::put_artifact)
                .delete(handlers::delete_artifact),
        )
        .route("/artifact/{kind}", post(handlers::post_artifact))
        .route("/artifact/{kind}/{id}/cost", get(handlers::get_cost))
        .route("/artifact/model/{id}/rate", get(handlers::get_rate))
        .route("/artifact/model/{id}/lineage", get(handlers::get_lineage))
        .route("/artifact/{kind}/{id}/audit", get(handlers::get_audit))
        .route("/reset", delete(handlers::delete_reset))
        .route("/healthz", get(handlers::healthz))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
