//! The lineage traversal's output shape.

use serde::{Deserialize, Serialize};

use super::ArtifactId;

/// One node in a lineage graph: either the queried model itself
/// (`relation = None`) or an ancestor reached by walking parent-model
/// edges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineageNode {
    pub artifact_id: ArtifactId,
    pub name: String,
    pub source_tag: Option<String>,
    pub metadata: serde_json::Value,
}

/// A directed parent -> child edge in the lineage graph, labeled with the
/// relation string recorded at ingest time (e.g. "finetune", "quantized").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineageEdge {
    pub from_id: ArtifactId,
    pub to_id: ArtifactId,
    pub relation_label: String,
}

/// The full graph returned by `GET /artifact/model/{id}/lineage`: the
/// queried model's ancestor chain plus itself as `this_model`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineageGraph {
    pub this_model: ArtifactId,
    pub nodes: Vec<LineageNode>,
    pub edges: Vec<LineageEdge>,
    #[serde(default)]
    pub truncated: bool,
}
