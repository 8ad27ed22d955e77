//! The metadata store's public contract.
//!
//! One trait, `MetadataStore`, covers the typed artifact catalog plus its
//! satellite tables (edges, readmes, ratings) because all of them commit
//! inside the same transaction on mutation: every insert/update/delete
//! is a single committed transaction.

use async_trait::async_trait;

use super::error::StorageResult;
use crate::model::{Artifact, ArtifactId, ArtifactQuery, EdgeRecord, Kind, Rating, ReadmeRecord};

/// What register/update extract from a model's metadata: the dependency
/// names to link as edges.
#[derive(Debug, Clone, Default)]
pub struct LinkedNames {
    pub datasets: Vec<String>,
    pub codebases: Vec<String>,
    pub parent_model: Option<ParentLink>,
}

#[derive(Debug, Clone)]
pub struct ParentLink {
    pub name: String,
    pub relation_label: String,
    pub source_tag: String,
}

#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Insert a new artifact row, its edges (models only), readme, and
    /// initial absence-of-rating. Returns `false` rather than raising if
    /// `(id, kind)` is already present.
    async fn insert(
        &self,
        artifact: &Artifact,
        linked: &LinkedNames,
        readme: Option<&str>,
    ) -> StorageResult<bool>;

    /// Remove the artifact row, its readme, its rating, edges where it is
    /// the destination, and null the `src_id` of edges where it is the
    /// source. Returns `false` if the row
    /// did not exist.
    async fn delete(&self, id: &ArtifactId, kind: Kind) -> StorageResult<bool>;

    /// Mutate the existing row's mutable fields in place (id/kind are
    /// immutable) and re-derive a model's outgoing edges from `linked`.
    /// Returns `false` if the row did not exist.
    async fn update(
        &self,
        id: &ArtifactId,
        kind: Kind,
        new_size_mb: f64,
        linked: &LinkedNames,
        readme: Option<&str>,
    ) -> StorageResult<bool>;

    async fn get_by_id(&self, id: &ArtifactId, kind: Kind) -> StorageResult<Option<Artifact>>;

    async fn exists(&self, id: &ArtifactId, kind: Kind) -> StorageResult<bool>;

    /// All artifacts across kinds sharing the exact name.
    async fn get_by_name(&self, name: &str) -> StorageResult<Vec<Artifact>>;

    /// Union of name-regex and readme-regex matches, deduplicated by id.
    async fn get_by_regex(&self, pattern: &str) -> StorageResult<Vec<Artifact>>;

    /// One page of a listing. `offset` is an opaque cursor; the returned
    /// cursor (if any) is handed back to the caller for the next page.
    async fn get_by_query(
        &self,
        query: &ArtifactQuery,
        offset: Option<&str>,
        page_size: usize,
    ) -> StorageResult<(Vec<Artifact>, Option<String>)>;

    async fn get_readme(&self, id: &ArtifactId, kind: Kind) -> StorageResult<Option<ReadmeRecord>>;

    async fn insert_rating(&self, rating: &Rating) -> StorageResult<()>;

    async fn get_rating(&self, model_id: &ArtifactId) -> StorageResult<Option<Rating>>;

    /// Edges where this artifact is the dependency (`src_id`), i.e. where
    /// some other artifact names it as a dataset/codebase/parent. Used by
    /// `delete` to null `src_id` on the artifact's own removal.
    async fn get_outgoing_edges(&self, src_id: &ArtifactId) -> StorageResult<Vec<EdgeRecord>>;

    /// Edges where this artifact is the destination (`dst_id`), i.e. its
    /// own dependency edges. A model's cost/lineage traversal walks these.
    async fn get_incoming_edges(&self, dst_id: &ArtifactId) -> StorageResult<Vec<EdgeRecord>>;

    /// Clears every artifact, edge, readme, and rating row. Used only by
    /// the `/reset` hard-reset endpoint.
    async fn reset(&self) -> StorageResult<()>;
}
