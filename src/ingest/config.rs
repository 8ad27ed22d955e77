//! Deferred ingest manager configuration: `deferred_queue_capacity`,
//! `ingest_asynchronous`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Bounded submission queue capacity; `submit` returns `false` rather
    /// than blocking once it's full.
    #[serde(default = "default_capacity")]
    pub deferred_queue_capacity: usize,
    /// When `true`, `register` requests are enqueued and return
    /// `DEFERRED` immediately instead of running the synchronous path.
    #[serde(default)]
    pub ingest_asynchronous: bool,
    /// Worker pool size draining the queue.
    #[serde(default = "default_workers")]
    pub workers: usize,
}

fn default_capacity() -> usize {
    256
}

fn default_workers() -> usize {
    4
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            deferred_queue_capacity: default_capacity(),
            ingest_asynchronous: false,
            workers: default_workers(),
        }
    }
}
