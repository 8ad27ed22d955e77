//! README bodies, keyed by `(id, kind)` and searchable by regex.

use serde::{Deserialize, Serialize};

use super::{ArtifactId, Kind};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadmeRecord {
    pub id: ArtifactId,
    pub kind: Kind,
    pub body: String,
}
