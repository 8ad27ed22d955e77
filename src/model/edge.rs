//! Directed edges between artifacts, with deferred id resolution.

use serde::{Deserialize, Serialize};

use super::ArtifactId;

/// The kind of relation an edge records. Only models have outgoing edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    ModelDataset,
    ModelCodebase,
    ModelParent,
}

impl Relation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ModelDataset => "model_dataset",
            Self::ModelCodebase => "model_codebase",
            Self::ModelParent => "model_parent",
        }
    }
}

/// A directed edge `src -> dst`, stored by name so it can be recorded before
/// the source artifact has been ingested. `src_id` starts `None` and is
/// patched in by `MetadataStore::insert` when a matching-name artifact
/// later appears (see `crate::storage::traits::MetadataStore`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub src_name: String,
    pub src_id: Option<ArtifactId>,
    pub dst_name: String,
    pub dst_id: ArtifactId,
    pub relation: Relation,
    pub relation_label: String,
    pub source_tag: String,
}

impl EdgeRecord {
    pub fn new(
        src_name: impl Into<String>,
        dst_name: impl Into<String>,
        dst_id: ArtifactId,
        relation: Relation,
        relation_label: impl Into<String>,
        source_tag: impl Into<String>,
    ) -> Self {
        Self {
            src_name: src_name.into(),
            src_id: None,
            dst_name: dst_name.into(),
            dst_id,
            relation,
            relation_label: relation_label.into(),
            source_tag: source_tag.into(),
        }
    }

    /// True once the source artifact has been ingested and this edge's
    /// `src_id` patched in.
    pub fn is_resolved(&self) -> bool {
        self.src_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_edge_starts_unresolved() {
        let dst = ArtifactId::from_source_url("https://huggingface.co/bert");
        let edge = EdgeRecord::new(
            "squad",
            "bert",
            dst,
            Relation::ModelDataset,
            "finetune",
            "model_card",
        );
        assert!(!edge.is_resolved());
    }
}
