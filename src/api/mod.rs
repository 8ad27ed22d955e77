//! The HTTP API: thin axum routing glue over the artifact accessor. Kept
//! separate from `crate::accessor` so the core stays transport-agnostic.

pub mod cache_decorator;
pub mod handlers;
pub mod response;
pub mod routes;
pub mod state;
pub mod types;

pub use routes::build_router;
pub use state::AppState;
