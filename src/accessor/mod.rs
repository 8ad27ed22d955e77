//! The artifact accessor: the transactional boundary coordinating the
//! metadata store, object store, rating engine, and audit log to uphold
//! cross-store consistency on register/update/delete/get.
//!
//! Every suspension point here (storage, object store, audit, cache,
//! download) is awaited without holding any in-memory lock across it.
//! The accessor itself carries no mutable state, only `Arc`s to the
//! subsystems it coordinates.

pub mod archive;
pub mod config;
pub mod derived;

pub use config::AccessorConfig;

use std::sync::Arc;

use tempfile::TempDir;

use crate::audit::{new_entry, AuditLog};
use crate::cache::ResponseCache;
use crate::download::{self, extract_linked_names, DownloadError};
use crate::error::{AccessError, RegistryError};
use crate::metrics::{default_metrics, DownloadedTree, RatingAggregator, RaterConfig};
use crate::model::{Action, Artifact, ArtifactId, ArtifactQuery, Kind, RegisterRequest};
use crate::objectstore::ObjectStore;
use crate::storage::{LinkedNames, MetadataStore};

/// Coordinates rating, download, metadata storage, object storage, audit,
/// and the response cache on every register/update/delete/get.
pub struct ArtifactAccessor {
    pub(crate) storage: Arc<dyn MetadataStore>,
    pub(crate) object_store: Arc<dyn ObjectStore>,
    pub(crate) audit: Arc<dyn AuditLog>,
    pub(crate) cache: Arc<dyn ResponseCache>,
    pub(crate) rater: RatingAggregator,
    pub(crate) rater_config: RaterConfig,
    pub(crate) config: AccessorConfig,
}

impl ArtifactAccessor {
    pub fn new(
        storage: Arc<dyn MetadataStore>,
        object_store: Arc<dyn ObjectStore>,
        audit: Arc<dyn AuditLog>,
        cache: Arc<dyn ResponseCache>,
        rater_config: RaterConfig,
        config: AccessorConfig,
    ) -> Self {
        let rater = RatingAggregator::new(default_metrics(&rater_config));
        Self {
            storage,
            object_store,
            audit,
            cache,
            rater,
            rater_config,
            config,
        }
    }

    /// `register`, steps 1-9. Ingest is atomic in the
    /// "all-or-nothing" sense: a `DISQUALIFIED` outcome (threshold miss,
    /// post-commit upload failure) leaves no trace of the attempt behind
    /// except log lines.
    pub async fn register(
        &self,
        kind: Kind,
        request: RegisterRequest,
        actor: &str,
    ) -> Result<Artifact, AccessError> {
        let id = ArtifactId::from_source_url(&request.url);

        if self.storage.exists(&id, kind).await.map_err(RegistryError::from)? {
            return Err(AccessError::already_exists(format!(
                "{kind} '{id}' already registered"
            )));
        }

        let scratch = TempDir::new().map_err(|e| AccessError::internal(format!("scratch dir: {e}")))?;
        let downloader = download::build(kind);
        let size_mb = downloader
            .download(&request.url, kind, scratch.path())
            .await
            .map_err(map_download_error)?;

        let name = request
            .name
            .unwrap_or_else(|| download::extract_name_from_url(&request.url, kind));
        let artifact = Artifact::new(id.clone(), name, kind, request.url.clone(), size_mb);

        let tree = DownloadedTree::new(scratch.path());
        let rating = self.rater.run(&tree, &artifact).await;
        if rating.net_score < self.rater_config.ingest_threshold {
            tracing::warn!(
                id = %id,
                kind = %kind,
                net_score = rating.net_score,
                threshold = self.rater_config.ingest_threshold,
                "ingest disqualified; scratch tree discarded, no state written"
            );
            return Err(AccessError::disqualified(format!(
                "net_score {:.3} below ingest_threshold {:.3}",
                rating.net_score, self.rater_config.ingest_threshold
            )));
        }

        let readme = archive::read_readme(scratch.path()).await;
        let linked = if kind == Kind::Model {
            readme
                .as_deref()
                .map(extract_linked_names)
                .unwrap_or_default()
        } else {
            LinkedNames::default()
        };

        // Metadata commit precedes blob upload so a post-commit failure
        // leaves a recoverable orphan row rather than an orphan blob.
        let inserted = self
            .storage
            .insert(&artifact, &linked, readme.as_deref())
            .await
            .map_err(RegistryError::from)?;
        if !inserted {
            // Lost a race against a concurrent register of the same
            // source URL: the loser sees the duplicate-key failure
            // because insert uses the id as primary key.
            return Err(AccessError::already_exists(format!(
                "{kind} '{id}' already registered"
            )));
        }

        self.storage
            .insert_rating(&rating)
            .await
            .map_err(RegistryError::from)?;

        let archive_bytes = archive::tar_gzip_dir(scratch.path())
            .map_err(|e| AccessError::internal(format!("archiving scratch dir: {e}")))?;
        if let Err(err) = self.object_store.upload(&id, archive_bytes).await {
            tracing::error!(id = %id, error = %err, "blob upload failed; rolling back metadata insert");
            if let Err(rollback_err) = self.storage.delete(&id, kind).await {
                tracing::error!(id = %id, error = %rollback_err, "rollback of orphaned metadata row also failed");
            }
            return Err(AccessError::disqualified(format!("blob upload failed: {err}")));
        }

        self.append_audit(&id, kind, &artifact.metadata.name, actor, Action::Create)
            .await;
        self.invalidate(&id, kind).await;

        tracing::info!(id = %id, kind = %kind, net_score = rating.net_score, "artifact registered");
        Ok(artifact)
    }

    /// `update`: re-downloads, uploads, updates size,
    /// rewrites edges and readme, appends `UPDATE` audit, invalidates
    /// cache. The id and kind are immutable; only `request.url` may differ
    /// from the original in practice (a same-URL update just refreshes
    /// the blob and re-derives edges from a possibly-changed readme).
    pub async fn update(
        &self,
        kind: Kind,
        id: &ArtifactId,
        request: RegisterRequest,
        actor: &str,
    ) -> Result<Artifact, AccessError> {
        let existing = self
            .storage
            .get_by_id(id, kind)
            .await
            .map_err(RegistryError::from)?
            .ok_or_else(|| AccessError::does_not_exist(format!("{kind} '{id}' does not exist")))?;

        let scratch = TempDir::new().map_err(|e| AccessError::internal(format!("scratch dir: {e}")))?;
        let downloader = download::build(kind);
        let size_mb = downloader
            .download(&request.url, kind, scratch.path())
            .await
            .map_err(map_download_error)?;

        let readme = archive::read_readme(scratch.path()).await;
        let linked = if kind == Kind::Model {
            readme
                .as_deref()
                .map(extract_linked_names)
                .unwrap_or_default()
        } else {
            LinkedNames::default()
        };

        let updated = self
            .storage
            .update(id, kind, size_mb, &linked, readme.as_deref())
            .await
            .map_err(RegistryError::from)?;
        if !updated {
            return Err(AccessError::does_not_exist(format!("{kind} '{id}' does not exist")));
        }

        let archive_bytes = archive::tar_gzip_dir(scratch.path())
            .map_err(|e| AccessError::internal(format!("archiving scratch dir: {e}")))?;
        self.object_store
            .upload(id, archive_bytes)
            .await
            .map_err(|err| AccessError::internal(format!("blob re-upload failed: {err}")))?;

        self.append_audit(id, kind, &existing.metadata.name, actor, Action::Update)
            .await;
        self.invalidate(id, kind).await;

        let mut result = existing;
        result.data.size_mb = size_mb;
        result.data.url = request.url;
        tracing::info!(id = %id, kind = %kind, "artifact updated");
        Ok(result)
    }

    /// `delete`: deletes the row, removes the blob, appends
    /// audit, invalidates cache. The `Action` enum has no dedicated
    /// delete variant (`CREATE, UPDATE, DOWNLOAD, RATE, AUDIT`), so
    /// deletion is recorded as `UPDATE`, the closest fit among the
    /// defined mutation actions.
    pub async fn delete(&self, kind: Kind, id: &ArtifactId, actor: &str) -> Result<(), AccessError> {
        let existing = self
            .storage
            .get_by_id(id, kind)
            .await
            .map_err(RegistryError::from)?
            .ok_or_else(|| AccessError::does_not_exist(format!("{kind} '{id}' does not exist")))?;

        let removed = self.storage.delete(id, kind).await.map_err(RegistryError::from)?;
        if !removed {
            return Err(AccessError::does_not_exist(format!("{kind} '{id}' does not exist")));
        }

        if let Err(err) = self.object_store.delete(id).await {
            // The metadata row is already gone; a stray blob is a
            // transient leftover the next reset/GC cycle clears, not a
            // reason to fail the user-visible delete.
            tracing::warn!(id = %id, error = %err, "blob delete failed after metadata row removed");
        }

        self.append_audit(id, kind, &existing.metadata.name, actor, Action::Update)
            .await;
        self.invalidate(id, kind).await;

        tracing::info!(id = %id, kind = %kind, "artifact deleted");
        Ok(())
    }

    /// `get`: mints a fresh presigned URL and appends a
    /// `DOWNLOAD` audit entry.
    pub async fn get(&self, kind: Kind, id: &ArtifactId, actor: &str) -> Result<Artifact, AccessError> {
        let mut artifact = self
            .storage
            .get_by_id(id, kind)
            .await
            .map_err(RegistryError::from)?
            .ok_or_else(|| AccessError::does_not_exist(format!("{kind} '{id}' does not exist")))?;

        match self
            .object_store
            .presigned_get(id, self.config.download_url_ttl)
            .await
        {
            Ok(url) => artifact.data.download_url = Some(url),
            Err(err) => {
                // A missing/unreachable blob doesn't hide the metadata row
                // from the caller; it just means no direct download link
                // this time. The object store is authoritative for the
                // binary, not for whether the row itself is visible.
                tracing::warn!(id = %id, error = %err, "presigned URL mint failed");
            }
        }

        self.append_audit(id, kind, &artifact.metadata.name, actor, Action::Download)
            .await;
        Ok(artifact)
    }

    pub async fn get_by_name(&self, name: &str) -> Result<Vec<Artifact>, AccessError> {
        let artifacts = self.storage.get_by_name(name).await.map_err(RegistryError::from)?;
        if artifacts.is_empty() {
            return Err(AccessError::does_not_exist(format!("no artifact named '{name}'")));
        }
        Ok(artifacts)
    }

    pub async fn get_by_regex(&self, pattern: &str) -> Result<Vec<Artifact>, AccessError> {
        let artifacts = self
            .storage
            .get_by_regex(pattern)
            .await
            .map_err(RegistryError::from)?;
        if artifacts.is_empty() {
            return Err(AccessError::does_not_exist(format!(
                "no artifact matching /{pattern}/"
            )));
        }
        Ok(artifacts)
    }

    /// `query`: one page of a listing. Returns
    /// `TOO_MANY_ARTIFACTS` only if the deployment's configured page size
    /// itself exceeds the hard cap, a configuration error, since the
    /// store never hands back more than `page_size` rows per call. The
    /// cap is enforced per page, not over the whole matching set;
    /// clients paginate via `offset`.
    pub async fn query(
        &self,
        query: &ArtifactQuery,
        offset: Option<&str>,
    ) -> Result<(Vec<Artifact>, Option<String>), AccessError> {
        if self.config.page_size > self.config.hard_cap {
            return Err(AccessError::too_many_artifacts(format!(
                "configured page_size {} exceeds hard cap {}",
                self.config.page_size, self.config.hard_cap
            )));
        }
        let (page, next) = self
            .storage
            .get_by_query(query, offset, self.config.page_size)
            .await
            .map_err(RegistryError::from)?;
        Ok((page, next))
    }

    /// Hard reset (`DELETE /reset`): clears
    /// the metadata store, the object store namespace, the audit log, and
    /// the cache. Metadata and object store are the two authoritative
    /// stores, so their failures propagate as `INTERNAL_ERROR`; audit and
    /// cache failures are logged and swallowed, same as everywhere else in
    /// the accessor.
    pub async fn reset(&self) -> Result<(), AccessError> {
        self.storage
            .reset()
            .await
            .map_err(|e| AccessError::internal(format!("metadata reset failed: {e}")))?;
        self.object_store
            .reset()
            .await
            .map_err(|e| AccessError::internal(format!("object store reset failed: {e}")))?;
        if let Err(err) = self.audit.reset().await {
            tracing::warn!(error = %err, "audit log reset failed");
        }
        if let Err(err) = self.cache.reset().await {
            tracing::warn!(error = %err, "cache reset failed (degrading silently)");
        }
        tracing::info!("registry hard reset complete");
        Ok(())
    }

    /// Invalidates every cache entry scoped to this artifact
    ///. Cache failures never propagate: a miss here just
    /// means a stale entry expires on its own TTL instead of being purged
    /// early.
    pub(crate) async fn invalidate(&self, id: &ArtifactId, kind: Kind) {
        if let Err(err) = self.cache.delete_by_artifact(id.as_str(), kind.as_str()).await {
            tracing::warn!(id = %id, kind = %kind, error = %err, "cache invalidation failed (degrading silently)");
        }
    }

    /// Appends an audit entry. Audit failures are logged and never abort
    /// the user-facing operation.
    pub(crate) async fn append_audit(
        &self,
        id: &ArtifactId,
        kind: Kind,
        name: &str,
        actor: &str,
        action: Action,
    ) {
        let entry = new_entry(id.clone(), kind, name, actor, action);
        if let Err(err) = self.audit.append(entry).await {
            tracing::error!(id = %id, kind = %kind, ?action, error = %err, "audit append failed");
        }
    }
}

fn map_download_error(err: DownloadError) -> AccessError {
    match err {
        DownloadError::NotFound(msg) | DownloadError::UnsupportedKind(msg) => {
            AccessError::bad_request(msg)
        }
        DownloadError::Transient(msg) => AccessError::disqualified(msg),
    }
}
