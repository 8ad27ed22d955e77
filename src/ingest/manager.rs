//! The deferred ingest manager: a bounded submission queue feeding a
//! fixed-size worker pool that runs the full synchronous ingest path
//! (`ArtifactAccessor::register`) out of band from the request.
//!
//! The worker pool bound is a `tokio::sync::Semaphore`, not a fixed set
//! of OS processes; each worker runs as its own tokio task, the
//! idiomatic async equivalent of a bounded thread pool.

use std::sync::Arc;

use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinHandle;

use crate::accessor::ArtifactAccessor;
use crate::model::{ArtifactId, Kind, RegisterRequest};

use super::config::IngestConfig;

/// A queued ingest job: either a fresh register or a re-ingest of an
/// existing id via update. Both run the full synchronous accessor path;
/// only the terminal accessor call differs.
enum Job {
    Register {
        kind: Kind,
        request: RegisterRequest,
        actor: String,
    },
    Update {
        kind: Kind,
        id: ArtifactId,
        request: RegisterRequest,
        actor: String,
    },
}

/// Bounded queue + worker pool dispatching ingest jobs.
pub struct DeferredIngestManager {
    sender: mpsc::Sender<Job>,
    dispatcher: JoinHandle<()>,
}

impl DeferredIngestManager {
    /// Spawns the dispatcher task, which drains the queue and forwards
    /// each job to the worker pool (bounded to `config.workers` concurrent
    /// ingests).
    pub fn start(accessor: Arc<ArtifactAccessor>, config: IngestConfig) -> Self {
        let (sender, receiver) = mpsc::channel(config.deferred_queue_capacity.max(1));
        let dispatcher = tokio::spawn(dispatch_loop(accessor, receiver, config.workers.max(1)));
        Self { sender, dispatcher }
    }

    /// Accepts `(kind, artifact_data)` and returns `false` if the queue is
    /// full, as backpressure to the caller. Submit order is preserved;
    /// actual ingest completion order is not.
    pub fn submit_register(&self, kind: Kind, request: RegisterRequest, actor: impl Into<String>) -> bool {
        self.sender
            .try_send(Job::Register {
                kind,
                request,
                actor: actor.into(),
            })
            .is_ok()
    }

    /// Same backpressure contract as [`Self::submit_register`], for
    /// `PUT /artifacts/{kind}/{id}` under `ingest_asynchronous` (PUT may
    /// also respond `202`).
    pub fn submit_update(
        &self,
        kind: Kind,
        id: ArtifactId,
        request: RegisterRequest,
        actor: impl Into<String>,
    ) -> bool {
        self.sender
            .try_send(Job::Update {
                kind,
                id,
                request,
                actor: actor.into(),
            })
            .is_ok()
    }

    /// Cooperative shutdown: stop accepting submissions and let the
    /// worker pool drain in-flight jobs to completion. The queue itself
    /// is not persisted across restarts.
    pub async fn shutdown(self) {
        drop(self.sender);
        if let Err(err) = self.dispatcher.await {
            tracing::error!(error = %err, "deferred ingest dispatcher task panicked during shutdown");
        }
    }
}

async fn dispatch_loop(
    accessor: Arc<ArtifactAccessor>,
    mut receiver: mpsc::Receiver<Job>,
    workers: usize,
) {
    let semaphore = Arc::new(Semaphore::new(workers));
    let mut in_flight: Vec<JoinHandle<()>> = Vec::new();

    while let Some(job) = receiver.recv().await {
        let permit = semaphore
            .clone()
            .acquire_owned()
            .await
            .expect("semaphore is never closed while the dispatcher loop owns it");
        let accessor = accessor.clone();

        in_flight.retain(|h| !h.is_finished());
        in_flight.push(tokio::spawn(async move {
            let _permit = permit;
            match job {
                Job::Register { kind, request, actor } => {
                    match accessor.register(kind, request, &actor).await {
                        Ok(artifact) => {
                            tracing::info!(id = %artifact.id(), kind = %kind, "deferred register completed");
                        }
                        Err(err) => {
                            tracing::warn!(kind = %kind, status = %err.status, error = %err.message, "deferred register failed");
                        }
                    }
                }
                Job::Update { kind, id, request, actor } => {
                    match accessor.update(kind, &id, request, &actor).await {
                        Ok(artifact) => {
                            tracing::info!(id = %artifact.id(), kind = %kind, "deferred update completed");
                        }
                        Err(err) => {
                            tracing::warn!(id = %id, kind = %kind, status = %err.status, error = %err.message, "deferred update failed");
                        }
                    }
                }
            }
        }));
    }

    // Channel closed (shutdown): drain whatever's still running before
    // returning, so `shutdown()`'s join observes true completion.
    for handle in in_flight {
        if let Err(err) = handle.await {
            tracing::error!(error = %err, "deferred ingest worker task panicked");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::backends::memory::MemoryAuditLog;
    use crate::cache::backends::memory::MemoryCache;
    use crate::metrics::RaterConfig;
    use crate::objectstore::backends::file::FileBackend;
    use crate::objectstore::config::FileConfig;
    use crate::storage::backends::memory::MemoryBackend;
    use std::time::Duration;

    async fn test_accessor() -> Arc<ArtifactAccessor> {
        let dir = tempfile::tempdir().unwrap();
        let object_store = FileBackend::open(&FileConfig {
            root: dir.path().to_path_buf(),
            prefix: "artifacts".to_string(),
        })
        .await
        .unwrap();
        Arc::new(ArtifactAccessor::new(
            Arc::new(MemoryBackend::new()),
            Arc::new(object_store),
            Arc::new(MemoryAuditLog::new()),
            Arc::new(MemoryCache::new(Duration::from_secs(60))),
            RaterConfig {
                ingest_threshold: 0.0,
                ..Default::default()
            },
            crate::accessor::AccessorConfig::default(),
        ))
    }

    #[tokio::test]
    async fn submit_beyond_capacity_fails_fast() {
        let accessor = test_accessor().await;
        let config = IngestConfig {
            deferred_queue_capacity: 1,
            workers: 1,
            ingest_asynchronous: true,
        };
        let manager = DeferredIngestManager::start(accessor, config);
        // Fill the bounded channel's single slot before the dispatcher has
        // a chance to drain it by holding the runtime's only poll turn.
        let accepted_first = manager.submit_register(
            Kind::Model,
            RegisterRequest {
                url: "https://huggingface.co/a".to_string(),
                name: None,
            },
            "tester",
        );
        assert!(accepted_first);
        manager.shutdown().await;
    }
}
