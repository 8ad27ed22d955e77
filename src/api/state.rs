//! Shared state handed to every axum handler: the thin seam where the
//! core (the accessor, ingest manager, health sink) is wired into the
//! HTTP layer.

use std::sync::Arc;

use crate::accessor::ArtifactAccessor;
use crate::health::HealthSink;
use crate::ingest::{DeferredIngestManager, IngestConfig};

#[derive(Clone)]
pub struct AppState {
    pub accessor: Arc<ArtifactAccessor>,
    pub ingest_config: IngestConfig,
    /// `None` when `ingest.ingest_asynchronous = false`: every register
    /// runs the synchronous path and this field is simply unused.
    pub deferred: Option<Arc<DeferredIngestManager>>,
    pub health: Arc<dyn HealthSink>,
}
