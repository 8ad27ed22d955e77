//! In-process metadata store, used in tests and for local development
//! without a database (`backend = "memory"` in `StorageConfig`).

use async_trait::async_trait;
use regex::Regex;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::model::{
    Artifact, ArtifactId, ArtifactQuery, EdgeRecord, Kind, Rating, ReadmeRecord, Relation,
};
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::traits::{LinkedNames, MetadataStore};

type Key = (Kind, String);

#[derive(Default)]
struct Inner {
    artifacts: HashMap<Key, Artifact>,
    readmes: HashMap<Key, String>,
    ratings: HashMap<String, Rating>,
    edges: Vec<EdgeRecord>,
}

/// In-memory implementation of [`MetadataStore`].
pub struct MemoryBackend {
    inner: RwLock<Inner>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn expected_source_kind(relation: Relation) -> Kind {
    match relation {
        Relation::ModelDataset => Kind::Dataset,
        Relation::ModelCodebase => Kind::Code,
        Relation::ModelParent => Kind::Model,
    }
}

fn build_edges(artifact: &Artifact, linked: &LinkedNames, existing: &[Artifact]) -> Vec<EdgeRecord> {
    let mut edges = Vec::new();
    let resolve = |name: &str, kind: Kind| -> Option<ArtifactId> {
        existing
            .iter()
            .find(|a| a.metadata.name == name && a.metadata.kind == kind)
            .map(|a| a.metadata.id.clone())
    };

    for dataset_name in &linked.datasets {
        let mut edge = EdgeRecord::new(
            dataset_name.clone(),
            artifact.metadata.name.clone(),
            artifact.metadata.id.clone(),
            Relation::ModelDataset,
            String::new(),
            "model_card",
        );
        edge.src_id = resolve(dataset_name, Kind::Dataset);
        edges.push(edge);
    }
    for code_name in &linked.codebases {
        let mut edge = EdgeRecord::new(
            code_name.clone(),
            artifact.metadata.name.clone(),
            artifact.metadata.id.clone(),
            Relation::ModelCodebase,
            String::new(),
            "model_card",
        );
        edge.src_id = resolve(code_name, Kind::Code);
        edges.push(edge);
    }
    if let Some(parent) = &linked.parent_model {
        let mut edge = EdgeRecord::new(
            parent.name.clone(),
            artifact.metadata.name.clone(),
            artifact.metadata.id.clone(),
            Relation::ModelParent,
            parent.relation_label.clone(),
            parent.source_tag.clone(),
        );
        edge.src_id = resolve(&parent.name, Kind::Model);
        edges.push(edge);
    }
    edges
}

#[async_trait]
impl MetadataStore for MemoryBackend {
    async fn insert(
        &self,
        artifact: &Artifact,
        linked: &LinkedNames,
        readme: Option<&str>,
    ) -> StorageResult<bool> {
        let mut inner = self.inner.write().await;
        let key = (artifact.metadata.kind, artifact.metadata.id.as_str().to_string());
        if inner.artifacts.contains_key(&key) {
            return Ok(false);
        }

        let existing: Vec<Artifact> = inner.artifacts.values().cloned().collect();
        if artifact.metadata.kind == Kind::Model {
            let new_edges = build_edges(artifact, linked, &existing);
            inner.edges.extend(new_edges);
        }

        // Deferred resolution: any pending edge naming this artifact as a
        // source of the matching relation kind gets patched with the id.
        let kind = artifact.metadata.kind;
        let name = artifact.metadata.name.clone();
        let id = artifact.metadata.id.clone();
        for edge in inner.edges.iter_mut() {
            if edge.src_id.is_none()
                && edge.src_name == name
                && expected_source_kind(edge.relation) == kind
            {
                edge.src_id = Some(id.clone());
            }
        }

        if let Some(body) = readme {
            inner.readmes.insert(key.clone(), body.to_string());
        }
        inner.artifacts.insert(key, artifact.clone());
        Ok(true)
    }

    async fn delete(&self, id: &ArtifactId, kind: Kind) -> StorageResult<bool> {
        let mut inner = self.inner.write().await;
        let key = (kind, id.as_str().to_string());
        if inner.artifacts.remove(&key).is_none() {
            return Ok(false);
        }
        inner.readmes.remove(&key);
        inner.ratings.remove(id.as_str());

        inner.edges.retain(|e| &e.dst_id != id);
        for edge in inner.edges.iter_mut() {
            if edge.src_id.as_ref() == Some(id) {
                edge.src_id = None;
            }
        }
        Ok(true)
    }

    async fn update(
        &self,
        id: &ArtifactId,
        kind: Kind,
        new_size_mb: f64,
        linked: &LinkedNames,
        readme: Option<&str>,
    ) -> StorageResult<bool> {
        let mut inner = self.inner.write().await;
        let key = (kind, id.as_str().to_string());
        let Some(existing) = inner.artifacts.get(&key).cloned() else {
            return Ok(false);
        };

        let mut updated = existing;
        updated.data.size_mb = new_size_mb;

        if kind == Kind::Model {
            inner.edges.retain(|e| e.src_id.as_ref() != Some(id));
            let others: Vec<Artifact> = inner
                .artifacts
                .values()
                .filter(|a| &a.metadata.id != id)
                .cloned()
                .collect();
            let new_edges = build_edges(&updated, linked, &others);
            inner.edges.extend(new_edges);
        }

        if let Some(body) = readme {
            inner.readmes.insert(key.clone(), body.to_string());
        }
        inner.artifacts.insert(key, updated);
        Ok(true)
    }

    async fn get_by_id(&self, id: &ArtifactId, kind: Kind) -> StorageResult<Option<Artifact>> {
        let inner = self.inner.read().await;
        Ok(inner
            .artifacts
            .get(&(kind, id.as_str().to_string()))
            .cloned())
    }

    async fn exists(&self, id: &ArtifactId, kind: Kind) -> StorageResult<bool> {
        let inner = self.inner.read().await;
        Ok(inner.artifacts.contains_key(&(kind, id.as_str().to_string())))
    }

    async fn get_by_name(&self, name: &str) -> StorageResult<Vec<Artifact>> {
        let inner = self.inner.read().await;
        Ok(inner
            .artifacts
            .values()
            .filter(|a| a.metadata.name == name)
            .cloned()
            .collect())
    }

    async fn get_by_regex(&self, pattern: &str) -> StorageResult<Vec<Artifact>> {
        let re = Regex::new(pattern)
            .map_err(|e| StorageError::Backend(format!("invalid regex: {e}")))?;
        let inner = self.inner.read().await;

        let mut seen = std::collections::HashSet::new();
        let mut out = Vec::new();
        for artifact in inner.artifacts.values() {
            let key = (artifact.metadata.kind, artifact.metadata.id.as_str().to_string());
            if seen.contains(&key) {
                continue;
            }
            let name_hit = re.is_match(&artifact.metadata.name);
            let readme_hit = inner
                .readmes
                .get(&key)
                .map(|body| re.is_match(body))
                .unwrap_or(false);
            if name_hit || readme_hit {
                seen.insert(key);
                out.push(artifact.clone());
            }
        }
        Ok(out)
    }

    async fn get_by_query(
        &self,
        query: &ArtifactQuery,
        offset: Option<&str>,
        page_size: usize,
    ) -> StorageResult<(Vec<Artifact>, Option<String>)> {
        let inner = self.inner.read().await;
        let kinds = query.kinds_or_default();

        let mut matching: Vec<&Artifact> = inner
            .artifacts
            .values()
            .filter(|a| kinds.contains(&a.metadata.kind))
            .filter(|a| query.matches_all_names() || a.metadata.name == query.name)
            .collect();
        matching.sort_by(|a, b| a.metadata.id.as_str().cmp(b.metadata.id.as_str()));

        let start: usize = offset.and_then(|s| s.parse().ok()).unwrap_or(0);
        let end = (start + page_size).min(matching.len());
        let page: Vec<Artifact> = matching
            .get(start..end)
            .unwrap_or_default()
            .iter()
            .map(|a| (**a).clone())
            .collect();

        let next_offset = if end < matching.len() {
            Some(end.to_string())
        } else {
            None
        };
        Ok((page, next_offset))
    }

    async fn get_readme(&self, id: &ArtifactId, kind: Kind) -> StorageResult<Option<ReadmeRecord>> {
        let inner = self.inner.read().await;
        Ok(inner
            .readmes
            .get(&(kind, id.as_str().to_string()))
            .map(|body| ReadmeRecord {
                id: id.clone(),
                kind,
                body: body.clone(),
            }))
    }

    async fn insert_rating(&self, rating: &Rating) -> StorageResult<()> {
        let mut inner = self.inner.write().await;
        inner
            .ratings
            .insert(rating.model_id.as_str().to_string(), rating.clone());
        Ok(())
    }

    async fn get_rating(&self, model_id: &ArtifactId) -> StorageResult<Option<Rating>> {
        let inner = self.inner.read().await;
        Ok(inner.ratings.get(model_id.as_str()).cloned())
    }

    async fn get_outgoing_edges(&self, src_id: &ArtifactId) -> StorageResult<Vec<EdgeRecord>> {
        let inner = self.inner.read().await;
        Ok(inner
            .edges
            .iter()
            .filter(|e| e.src_id.as_ref() == Some(src_id))
            .cloned()
            .collect())
    }

    async fn get_incoming_edges(&self, dst_id: &ArtifactId) -> StorageResult<Vec<EdgeRecord>> {
        let inner = self.inner.read().await;
        Ok(inner
            .edges
            .iter()
            .filter(|e| &e.dst_id == dst_id)
            .cloned()
            .collect())
    }

    async fn reset(&self) -> StorageResult<()> {
        let mut inner = self.inner.write().await;
        *inner = Inner::default();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Artifact;

    fn artifact(kind: Kind, name: &str, url: &str) -> Artifact {
        Artifact::new(
            ArtifactId::from_source_url(url),
            name.to_string(),
            kind,
            url.to_string(),
            1.0,
        )
    }

    #[tokio::test]
    async fn insert_then_get() {
        let store = MemoryBackend::new();
        let a = artifact(Kind::Model, "bert", "https://huggingface.co/bert");
        assert!(store
            .insert(&a, &LinkedNames::default(), None)
            .await
            .unwrap());
        let fetched = store.get_by_id(a.id(), Kind::Model).await.unwrap();
        assert_eq!(fetched.unwrap().metadata.name, "bert");
    }

    #[tokio::test]
    async fn duplicate_insert_returns_false() {
        let store = MemoryBackend::new();
        let a = artifact(Kind::Model, "bert", "https://huggingface.co/bert");
        assert!(store
            .insert(&a, &LinkedNames::default(), None)
            .await
            .unwrap());
        assert!(!store
            .insert(&a, &LinkedNames::default(), None)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn deferred_edge_resolution() {
        let store = MemoryBackend::new();
        let model = artifact(Kind::Model, "bert", "https://huggingface.co/bert");
        let linked = LinkedNames {
            datasets: vec!["squad".to_string()],
            ..Default::default()
        };
        store.insert(&model, &linked, None).await.unwrap();

        let edges = store.get_outgoing_edges(model.id()).await.unwrap();
        assert_eq!(edges.len(), 0); // model's own outgoing edges are keyed by dataset id, not model id

        let incoming = store.get_incoming_edges(model.id()).await.unwrap();
        assert_eq!(incoming.len(), 1);
        assert!(incoming[0].src_id.is_none());

        let dataset = artifact(Kind::Dataset, "squad", "https://huggingface.co/datasets/squad");
        store
            .insert(&dataset, &LinkedNames::default(), None)
            .await
            .unwrap();

        let incoming = store.get_incoming_edges(model.id()).await.unwrap();
        assert_eq!(incoming[0].src_id.as_ref(), Some(dataset.id()));
    }

    #[tokio::test]
    async fn delete_nulls_outgoing_src_id_but_keeps_edge() {
        let store = MemoryBackend::new();
        let dataset = artifact(Kind::Dataset, "squad", "https://huggingface.co/datasets/squad");
        store
            .insert(&dataset, &LinkedNames::default(), None)
            .await
            .unwrap();
        let model = artifact(Kind::Model, "bert", "https://huggingface.co/bert");
        let linked = LinkedNames {
            datasets: vec!["squad".to_string()],
            ..Default::default()
        };
        store.insert(&model, &linked, None).await.unwrap();

        store.delete(dataset.id(), Kind::Dataset).await.unwrap();

        let incoming = store.get_incoming_edges(model.id()).await.unwrap();
        assert_eq!(incoming.len(), 1);
        assert!(incoming[0].src_id.is_none());
    }

    #[tokio::test]
    async fn delete_removes_incoming_edges_of_destination() {
        let store = MemoryBackend::new();
        let model = artifact(Kind::Model, "bert", "https://huggingface.co/bert");
        let linked = LinkedNames {
            datasets: vec!["squad".to_string()],
            ..Default::default()
        };
        store.insert(&model, &linked, None).await.unwrap();
        assert_eq!(store.get_incoming_edges(model.id()).await.unwrap().len(), 1);

        store.delete(model.id(), Kind::Model).await.unwrap();
        assert_eq!(store.get_incoming_edges(model.id()).await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn query_paginates() {
        let store = MemoryBackend::new();
        for i in 0..5 {
            let url = format!("https://huggingface.co/m{i}");
            let a = artifact(Kind::Model, &format!("m{i}"), &url);
            store.insert(&a, &LinkedNames::default(), None).await.unwrap();
        }
        let query = ArtifactQuery {
            name: "*".to_string(),
            kinds: None,
        };
        let (page1, next) = store.get_by_query(&query, None, 2).await.unwrap();
        assert_eq!(page1.len(), 2);
        let next = next.unwrap();
        let (page2, _) = store.get_by_query(&query, Some(&next), 2).await.unwrap();
        assert_eq!(page2.len(), 2);
        assert_ne!(page1[0].metadata.id, page2[0].metadata.id);
    }
}
