//! Append-only audit entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::{ArtifactId, Kind};

/// The action an audit entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Create,
    Update,
    Download,
    Rate,
    Audit,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Download => "DOWNLOAD",
            Self::Rate => "RATE",
            Self::Audit => "AUDIT",
        }
    }
}

/// One append-only audit record. `id` is the hash of the entry's own
/// contents, which makes retries idempotent for free: a
/// retried `append` computes the same id and the store treats the
/// duplicate primary key as a no-op rather than a double record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: String,
    pub artifact_id: ArtifactId,
    pub kind: Kind,
    pub name: String,
    pub actor: String,
    pub timestamp: DateTime<Utc>,
    pub action: Action,
}

impl AuditEntry {
    /// Build an entry and derive its content-hash primary key.
    ///
    /// The timestamp is part of the hash, so two logically-identical
    /// actions taken at different times are distinct entries; only a
    /// byte-for-byte retry (same timestamp, same actor) collides, making
    /// such a retry idempotent.
    pub fn new(
        artifact_id: ArtifactId,
        kind: Kind,
        name: impl Into<String>,
        actor: impl Into<String>,
        timestamp: DateTime<Utc>,
        action: Action,
    ) -> Self {
        let name = name.into();
        let actor = actor.into();
        let id = Self::content_hash(&artifact_id, kind, &name, &actor, timestamp, action);
        Self {
            id,
            artifact_id,
            kind,
            name,
            actor,
            timestamp,
            action,
        }
    }

    fn content_hash(
        artifact_id: &ArtifactId,
        kind: Kind,
        name: &str,
        actor: &str,
        timestamp: DateTime<Utc>,
        action: Action,
    ) -> String {
        let mut hasher = Sha256::new();
        hasher.update(artifact_id.as_str().as_bytes());
        hasher.update(b"\0");
        hasher.update(kind.as_str().as_bytes());
        hasher.update(b"\0");
        hasher.update(name.as_bytes());
        hasher.update(b"\0");
        hasher.update(actor.as_bytes());
        hasher.update(b"\0");
        hasher.update(timestamp.to_rfc3339().as_bytes());
        hasher.update(b"\0");
        hasher.update(action.as_str().as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn identical_entries_hash_identically() {
        let id = ArtifactId::from_source_url("https://huggingface.co/bert");
        let ts = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let a = AuditEntry::new(id.clone(), Kind::Model, "bert", "alice", ts, Action::Create);
        let b = AuditEntry::new(id, Kind::Model, "bert", "alice", ts, Action::Create);
        assert_eq!(a.id, b.id);
    }
}
