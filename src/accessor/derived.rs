//! Derived query routers: cost (transitive size), lineage (ancestor
//! chain), audit retrieval, and rating retrieval. Each walks the metadata
//! store's edge table starting from one artifact; none of them mutate
//! anything except appending the audit trail entry required for the act
//! of reading it.

use serde_json::json;

use super::ArtifactAccessor;
use crate::error::{AccessError, RegistryError};
use crate::model::{
    Action, ArtifactId, AuditEntry, CostBreakdown, Kind, LineageEdge, LineageGraph, LineageNode,
    Rating, Relation,
};

impl ArtifactAccessor {
    /// Cost query. When `include_dependencies` is
    /// false, or the artifact isn't a model, cost is just its own size
    /// both ways. For a model with dependencies requested, walks the
    /// parent-model ancestor chain (bounded by
    /// `AccessorConfig::max_lineage_depth`) summing ancestor sizes, plus
    /// each visited model's linked dataset/codebase sizes.
    pub async fn cost(
        &self,
        kind: Kind,
        id: &ArtifactId,
        include_dependencies: bool,
    ) -> Result<CostBreakdown, AccessError> {
        let artifact = self
            .storage
            .get_by_id(id, kind)
            .await
            .map_err(RegistryError::from)?
            .ok_or_else(|| AccessError::does_not_exist(format!("{kind} '{id}' does not exist")))?;

        if !include_dependencies || kind != Kind::Model {
            return Ok(CostBreakdown {
                standalone_cost: artifact.data.size_mb,
                total_cost: artifact.data.size_mb,
                truncated: false,
            });
        }

        let mut total = artifact.data.size_mb;
        let mut current = id.clone();
        // Assume the depth bound is what ends the walk; every `break`
        // below that corresponds to a legitimate end-of-chain sets this
        // false.
        let mut truncated = true;

        for _ in 0..self.config.max_lineage_depth {
            let incoming = self
                .storage
                .get_incoming_edges(&current)
                .await
                .map_err(RegistryError::from)?;

            for edge in &incoming {
                if edge.relation != Relation::ModelParent {
                    if let Some(dep_id) = &edge.src_id {
                        if let Some(dep) = self
                            .storage
                            .get_by_id(dep_id, expected_kind(edge.relation))
                            .await
                            .map_err(RegistryError::from)?
                        {
                            total += dep.data.size_mb;
                        }
                    }
                }
            }

            let Some(parent_edge) = incoming.iter().find(|e| e.relation == Relation::ModelParent) else {
                truncated = false;
                break;
            };
            let Some(parent_id) = &parent_edge.src_id else {
                // Parent named but not yet ingested (deferred resolution);
                // nothing more to sum.
                truncated = false;
                break;
            };
            let Some(parent) = self
                .storage
                .get_by_id(parent_id, Kind::Model)
                .await
                .map_err(RegistryError::from)?
            else {
                truncated = false;
                break;
            };
            total += parent.data.size_mb;
            current = parent_id.clone();
        }

        Ok(CostBreakdown {
            standalone_cost: artifact.data.size_mb,
            total_cost: total,
            truncated,
        })
    }

    /// Lineage query. Returns `None` if `id`
    /// doesn't resolve to a model. Walks the same parent-model chain as
    /// `cost`, but records nodes and labeled edges instead of summing
    /// sizes.
    pub async fn lineage(&self, id: &ArtifactId) -> Result<Option<LineageGraph>, AccessError> {
        let Some(this_model) = self
            .storage
            .get_by_id(id, Kind::Model)
            .await
            .map_err(RegistryError::from)?
        else {
            return Ok(None);
        };

        let mut nodes = vec![LineageNode {
            artifact_id: id.clone(),
            name: this_model.metadata.name.clone(),
            source_tag: None,
            metadata: json!({}),
        }];
        let mut edges = Vec::new();
        let mut current = id.clone();
        let mut truncated = true;

        for _ in 0..self.config.max_lineage_depth {
            let incoming = self
                .storage
                .get_incoming_edges(&current)
                .await
                .map_err(RegistryError::from)?;
            let Some(parent_edge) = incoming.iter().find(|e| e.relation == Relation::ModelParent) else {
                truncated = false;
                break;
            };
            let Some(parent_id) = &parent_edge.src_id else {
                // Parent name recorded but not yet ingested; the chain
                // ends here, not because of the depth bound.
                truncated = false;
                break;
            };
            let Some(parent) = self
                .storage
                .get_by_id(parent_id, Kind::Model)
                .await
                .map_err(RegistryError::from)?
            else {
                truncated = false;
                break;
            };

            nodes.push(LineageNode {
                artifact_id: parent_id.clone(),
                name: parent.metadata.name.clone(),
                source_tag: Some(parent_edge.source_tag.clone()),
                metadata: json!({}),
            });
            edges.push(LineageEdge {
                from_id: parent_id.clone(),
                to_id: current.clone(),
                relation_label: parent_edge.relation_label.clone(),
            });

            current = parent_id.clone();
        }

        Ok(Some(LineageGraph {
            this_model: id.clone(),
            nodes,
            edges,
            truncated,
        }))
    }

    /// Audit retrieval. Retrieving the history is itself auditable:
    /// appends one more `AUDIT` entry after the read.
    pub async fn get_audit(
        &self,
        kind: Kind,
        id: &ArtifactId,
        actor: &str,
    ) -> Result<Vec<AuditEntry>, AccessError> {
        let artifact = self
            .storage
            .get_by_id(id, kind)
            .await
            .map_err(RegistryError::from)?
            .ok_or_else(|| AccessError::does_not_exist(format!("{kind} '{id}' does not exist")))?;

        let entries = self
            .audit
            .get_by_artifact(id, kind)
            .await
            .map_err(RegistryError::from)?
            .ok_or_else(|| AccessError::does_not_exist(format!("no audit history for {kind} '{id}'")))?;

        self.append_audit(id, kind, &artifact.metadata.name, actor, Action::Audit)
            .await;
        Ok(entries)
    }

    /// Rating retrieval. Appends `RATE` audit on a successful read, same
    /// as the sibling `get_audit`: an early `DOES_NOT_EXIST`/`not rated`
    /// return skips the audit append.
    pub async fn get_rating(&self, id: &ArtifactId, actor: &str) -> Result<Rating, AccessError> {
        let artifact = self
            .storage
            .get_by_id(id, Kind::Model)
            .await
            .map_err(RegistryError::from)?
            .ok_or_else(|| AccessError::does_not_exist(format!("model '{id}' does not exist")))?;

        let rating = self
            .storage
            .get_rating(id)
            .await
            .map_err(RegistryError::from)?
            .ok_or_else(|| AccessError::does_not_exist(format!("model '{id}' has not been rated")))?;

        self.append_audit(id, Kind::Model, &artifact.metadata.name, actor, Action::Rate)
            .await;
        Ok(rating)
    }
}

fn expected_kind(relation: Relation) -> Kind {
    match relation {
        Relation::ModelDataset => Kind::Dataset,
        Relation::ModelCodebase => Kind::Code,
        Relation::ModelParent => Kind::Model,
    }
}
