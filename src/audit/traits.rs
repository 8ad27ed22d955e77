//! The audit log's public contract.

use async_trait::async_trait;

use super::error::AuditResult;
use crate::model::{Action, ArtifactId, AuditEntry, Kind};

#[async_trait]
pub trait AuditLog: Send + Sync {
    /// Appends an entry. Idempotent: since the primary key is the
    /// content hash (`AuditEntry::new`), a retried append with identical
    /// fields is a silent no-op rather than a duplicate record
    ///.
    async fn append(&self, entry: AuditEntry) -> AuditResult<bool>;

    /// `None` if the artifact has no audit history at all; `Some(vec![])`
    /// never occurs in practice because every artifact that exists has at
    /// least a `CREATE` entry.
    async fn get_by_artifact(&self, id: &ArtifactId, kind: Kind) -> AuditResult<Option<Vec<AuditEntry>>>;

    /// Clears every entry. Used only by the `/reset` hard-reset endpoint
    ///.
    async fn reset(&self) -> AuditResult<()>;
}

/// Convenience for building an entry with the current time, used by every
/// call site so the `Action`/actor plumbing stays uniform.
pub fn new_entry(
    id: ArtifactId,
    kind: Kind,
    name: impl Into<String>,
    actor: impl Into<String>,
    action: Action,
) -> AuditEntry {
    AuditEntry::new(id, kind, name, actor, chrono::Utc::now(), action)
}
