//! In-process audit log, used in tests and when `audit.backend = "memory"`.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::audit::error::AuditResult;
use crate::audit::traits::AuditLog;
use crate::model::{Action, ArtifactId, AuditEntry, Kind};

#[derive(Default)]
pub struct MemoryAuditLog {
    // Keyed by content hash so retried appends are free no-ops, and grouped
    // per (id, kind) so `get_by_artifact` doesn't need a linear scan.
    entries: RwLock<HashMap<(Kind, String), Vec<AuditEntry>>>,
    seen_ids: RwLock<std::collections::HashSet<String>>,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuditLog for MemoryAuditLog {
    async fn append(&self, entry: AuditEntry) -> AuditResult<bool> {
        let mut seen = self.seen_ids.write().await;
        if !seen.insert(entry.id.clone()) {
            return Ok(false);
        }
        let key = (entry.kind, entry.artifact_id.as_str().to_string());
        self.entries.write().await.entry(key).or_default().push(entry);
        Ok(true)
    }

    async fn get_by_artifact(&self, id: &ArtifactId, kind: Kind) -> AuditResult<Option<Vec<AuditEntry>>> {
        let entries = self.entries.read().await;
        Ok(entries.get(&(kind, id.as_str().to_string())).cloned())
    }

    async fn reset(&self) -> AuditResult<()> {
        self.entries.write().await.clear();
        self.seen_ids.write().await.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn entry(action: Action) -> AuditEntry {
        AuditEntry::new(
            ArtifactId::from_source_url("https://huggingface.co/bert"),
            Kind::Model,
            "bert",
            "tester",
            Utc::now(),
            action,
        )
    }

    #[tokio::test]
    async fn append_then_retrieve() {
        let log = MemoryAuditLog::new();
        let e = entry(Action::Create);
        let id = e.artifact_id.clone();
        assert!(log.append(e).await.unwrap());

        let history = log.get_by_artifact(&id, Kind::Model).await.unwrap().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].action, Action::Create);
    }

    #[tokio::test]
    async fn duplicate_append_is_idempotent() {
        let log = MemoryAuditLog::new();
        let e = entry(Action::Create);
        let id = e.artifact_id.clone();
        assert!(log.append(e.clone()).await.unwrap());
        assert!(!log.append(e).await.unwrap());

        let history = log.get_by_artifact(&id, Kind::Model).await.unwrap().unwrap();
        assert_eq!(history.len(), 1);
    }

    #[tokio::test]
    async fn unknown_artifact_returns_none() {
        let log = MemoryAuditLog::new();
        let id = ArtifactId::from_source_url("https://huggingface.co/never-seen");
        assert!(log.get_by_artifact(&id, Kind::Model).await.unwrap().is_none());
    }
}
