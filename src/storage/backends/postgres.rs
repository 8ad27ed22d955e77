//! PostgreSQL-backed metadata store.
//!
//! Schema is created lazily on connect (`CREATE TABLE IF NOT EXISTS`,
//! schema-qualified) rather than driven through a migration tool.

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::Row;
use std::str::FromStr;
use tracing::{debug, info};

use crate::model::{
    Artifact, ArtifactData, ArtifactId, ArtifactMetadata, ArtifactQuery, DeploymentTargetScores,
    EdgeRecord, Kind, MetricResult, Rating, ReadmeRecord, Relation,
};
use crate::storage::config::PostgresConfig;
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::traits::{LinkedNames, MetadataStore};

pub struct PostgresBackend {
    pool: sqlx::PgPool,
    schema: String,
}

impl PostgresBackend {
    pub async fn connect(config: &PostgresConfig) -> StorageResult<Self> {
        let opts = PgConnectOptions::from_str(&config.connection_string)
            .map_err(|e| StorageError::connection(e.to_string()))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.connection_timeout)
            .connect_with(opts)
            .await
            .map_err(|e| StorageError::connection(e.to_string()))?;

        let backend = Self {
            pool,
            schema: config.schema.clone(),
        };
        backend.ensure_schema().await?;
        Ok(backend)
    }

    fn table(&self, name: &str) -> String {
        format!("{}.{}", self.schema, name)
    }

    async fn ensure_schema(&self) -> StorageResult<()> {
        info!(schema = %self.schema, "ensuring metadata store schema");
        sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {}", self.schema))
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::backend(e.to_string()))?;

        let artifacts = self.table("artifacts");
        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS {artifacts} (
                id TEXT NOT NULL,
                kind TEXT NOT NULL,
                name TEXT NOT NULL,
                url TEXT NOT NULL,
                size_mb DOUBLE PRECISION NOT NULL,
                download_url TEXT,
                PRIMARY KEY (id, kind)
            )"
        ))
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::backend(e.to_string()))?;

        sqlx::query(&format!(
            "CREATE INDEX IF NOT EXISTS idx_{schema}_artifacts_name ON {artifacts} (name)",
            schema = self.schema,
        ))
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::backend(e.to_string()))?;

        let readmes = self.table("readmes");
        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS {readmes} (
                id TEXT NOT NULL,
                kind TEXT NOT NULL,
                body TEXT NOT NULL,
                PRIMARY KEY (id, kind)
            )"
        ))
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::backend(e.to_string()))?;

        let ratings = self.table("ratings");
        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS {ratings} (
                model_id TEXT PRIMARY KEY,
                net_score DOUBLE PRECISION NOT NULL,
                metrics_json TEXT NOT NULL,
                size_breakdown_json TEXT
            )"
        ))
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::backend(e.to_string()))?;

        let edges = self.table("edges");
        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS {edges} (
                src_name TEXT NOT NULL,
                src_id TEXT,
                dst_name TEXT NOT NULL,
                dst_id TEXT NOT NULL,
                relation TEXT NOT NULL,
                relation_label TEXT NOT NULL,
                source_tag TEXT NOT NULL
            )"
        ))
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::backend(e.to_string()))?;

        sqlx::query(&format!(
            "CREATE INDEX IF NOT EXISTS idx_{schema}_edges_src_name ON {edges} (src_name)",
            schema = self.schema,
        ))
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::backend(e.to_string()))?;

        sqlx::query(&format!(
            "CREATE INDEX IF NOT EXISTS idx_{schema}_edges_dst_id ON {edges} (dst_id)",
            schema = self.schema,
        ))
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::backend(e.to_string()))?;

        Ok(())
    }

    fn expected_source_kind(relation: Relation) -> Kind {
        match relation {
            Relation::ModelDataset => Kind::Dataset,
            Relation::ModelCodebase => Kind::Code,
            Relation::ModelParent => Kind::Model,
        }
    }

    async fn resolve_src_id(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        name: &str,
        kind: Kind,
    ) -> StorageResult<Option<ArtifactId>> {
        let artifacts = self.table("artifacts");
        let row = sqlx::query(&format!(
            "SELECT id FROM {artifacts} WHERE name = $1 AND kind = $2"
        ))
        .bind(name)
        .bind(kind.as_str())
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| StorageError::backend(e.to_string()))?;
        Ok(row.map(|r| ArtifactId::parse(r.get::<String, _>("id")).expect("stored id is valid")))
    }

    async fn insert_edges(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        artifact: &Artifact,
        linked: &LinkedNames,
    ) -> StorageResult<()> {
        let edges = self.table("edges");
        let mut new_edges = Vec::new();
        for dataset in &linked.datasets {
            let mut e = EdgeRecord::new(
                dataset.clone(),
                artifact.metadata.name.clone(),
                artifact.metadata.id.clone(),
                Relation::ModelDataset,
                String::new(),
                "model_card",
            );
            e.src_id = self.resolve_src_id(tx, dataset, Kind::Dataset).await?;
            new_edges.push(e);
        }
        for code in &linked.codebases {
            let mut e = EdgeRecord::new(
                code.clone(),
                artifact.metadata.name.clone(),
                artifact.metadata.id.clone(),
                Relation::ModelCodebase,
                String::new(),
                "model_card",
            );
            e.src_id = self.resolve_src_id(tx, code, Kind::Code).await?;
            new_edges.push(e);
        }
        if let Some(parent) = &linked.parent_model {
            let mut e = EdgeRecord::new(
                parent.name.clone(),
                artifact.metadata.name.clone(),
                artifact.metadata.id.clone(),
                Relation::ModelParent,
                parent.relation_label.clone(),
                parent.source_tag.clone(),
            );
            e.src_id = self.resolve_src_id(tx, &parent.name, Kind::Model).await?;
            new_edges.push(e);
        }

        for e in &new_edges {
            sqlx::query(&format!(
                "INSERT INTO {edges} (src_name, src_id, dst_name, dst_id, relation, relation_label, source_tag)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)"
            ))
            .bind(&e.src_name)
            .bind(e.src_id.as_ref().map(|id| id.as_str()))
            .bind(&e.dst_name)
            .bind(e.dst_id.as_str())
            .bind(e.relation.as_str())
            .bind(&e.relation_label)
            .bind(&e.source_tag)
            .execute(&mut **tx)
            .await
            .map_err(|e| StorageError::backend(e.to_string()))?;
        }
        Ok(())
    }

    async fn patch_deferred_edges(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        name: &str,
        kind: Kind,
        id: &ArtifactId,
    ) -> StorageResult<()> {
        let edges = self.table("edges");
        for relation in [
            Relation::ModelDataset,
            Relation::ModelCodebase,
            Relation::ModelParent,
        ] {
            if Self::expected_source_kind(relation) != kind {
                continue;
            }
            sqlx::query(&format!(
                "UPDATE {edges} SET src_id = $1
                 WHERE src_name = $2 AND src_id IS NULL AND relation = $3"
            ))
            .bind(id.as_str())
            .bind(name)
            .bind(relation.as_str())
            .execute(&mut **tx)
            .await
            .map_err(|e| StorageError::backend(e.to_string()))?;
        }
        Ok(())
    }

    fn row_to_edge(row: &sqlx::postgres::PgRow) -> StorageResult<EdgeRecord> {
        let relation: String = row.get("relation");
        let relation = match relation.as_str() {
            "model_dataset" => Relation::ModelDataset,
            "model_codebase" => Relation::ModelCodebase,
            "model_parent" => Relation::ModelParent,
            other => return Err(StorageError::Serialization(format!("unknown relation {other}"))),
        };
        let src_id: Option<String> = row.get("src_id");
        Ok(EdgeRecord {
            src_name: row.get("src_name"),
            src_id: src_id.map(|s| ArtifactId::parse(s).expect("stored id is valid")),
            dst_name: row.get("dst_name"),
            dst_id: ArtifactId::parse(row.get::<String, _>("dst_id")).expect("stored id is valid"),
            relation,
            relation_label: row.get("relation_label"),
            source_tag: row.get("source_tag"),
        })
    }

    fn row_to_artifact(row: &sqlx::postgres::PgRow) -> StorageResult<Artifact> {
        let kind: String = row.get("kind");
        let kind = Kind::from_str(&kind)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        Ok(Artifact {
            metadata: ArtifactMetadata {
                id: ArtifactId::parse(row.get::<String, _>("id")).expect("stored id is valid"),
                name: row.get("name"),
                kind,
            },
            data: ArtifactData {
                url: row.get("url"),
                size_mb: row.get("size_mb"),
                download_url: row.get("download_url"),
            },
        })
    }
}

#[async_trait]
impl MetadataStore for PostgresBackend {
    async fn insert(
        &self,
        artifact: &Artifact,
        linked: &LinkedNames,
        readme: Option<&str>,
    ) -> StorageResult<bool> {
        let artifacts = self.table("artifacts");
        let readmes = self.table("readmes");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StorageError::Transaction(e.to_string()))?;

        let existing = sqlx::query(&format!(
            "SELECT 1 FROM {artifacts} WHERE id = $1 AND kind = $2"
        ))
        .bind(artifact.metadata.id.as_str())
        .bind(artifact.metadata.kind.as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| StorageError::backend(e.to_string()))?;
        if existing.is_some() {
            return Ok(false);
        }

        sqlx::query(&format!(
            "INSERT INTO {artifacts} (id, kind, name, url, size_mb, download_url)
             VALUES ($1, $2, $3, $4, $5, $6)"
        ))
        .bind(artifact.metadata.id.as_str())
        .bind(artifact.metadata.kind.as_str())
        .bind(&artifact.metadata.name)
        .bind(&artifact.data.url)
        .bind(artifact.data.size_mb)
        .bind(&artifact.data.download_url)
        .execute(&mut *tx)
        .await
        .map_err(|e| StorageError::backend(e.to_string()))?;

        if let Some(body) = readme {
            sqlx::query(&format!(
                "INSERT INTO {readmes} (id, kind, body) VALUES ($1, $2, $3)"
            ))
            .bind(artifact.metadata.id.as_str())
            .bind(artifact.metadata.kind.as_str())
            .bind(body)
            .execute(&mut *tx)
            .await
            .map_err(|e| StorageError::backend(e.to_string()))?;
        }

        if artifact.metadata.kind == Kind::Model {
            self.insert_edges(&mut tx, artifact, linked).await?;
        }
        self.patch_deferred_edges(
            &mut tx,
            &artifact.metadata.name,
            artifact.metadata.kind,
            &artifact.metadata.id,
        )
        .await?;

        tx.commit()
            .await
            .map_err(|e| StorageError::Transaction(e.to_string()))?;
        debug!(id = %artifact.metadata.id, kind = %artifact.metadata.kind, "inserted artifact");
        Ok(true)
    }

    async fn delete(&self, id: &ArtifactId, kind: Kind) -> StorageResult<bool> {
        let artifacts = self.table("artifacts");
        let readmes = self.table("readmes");
        let ratings = self.table("ratings");
        let edges = self.table("edges");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StorageError::Transaction(e.to_string()))?;

        let result = sqlx::query(&format!("DELETE FROM {artifacts} WHERE id = $1 AND kind = $2"))
            .bind(id.as_str())
            .bind(kind.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| StorageError::backend(e.to_string()))?;
        if result.rows_affected() == 0 {
            return Ok(false);
        }

        sqlx::query(&format!("DELETE FROM {readmes} WHERE id = $1 AND kind = $2"))
            .bind(id.as_str())
            .bind(kind.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| StorageError::backend(e.to_string()))?;

        if kind == Kind::Model {
            sqlx::query(&format!("DELETE FROM {ratings} WHERE model_id = $1"))
                .bind(id.as_str())
                .execute(&mut *tx)
                .await
                .map_err(|e| StorageError::backend(e.to_string()))?;
        }

        sqlx::query(&format!("DELETE FROM {edges} WHERE dst_id = $1"))
            .bind(id.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| StorageError::backend(e.to_string()))?;

        sqlx::query(&format!("UPDATE {edges} SET src_id = NULL WHERE src_id = $1"))
            .bind(id.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| StorageError::backend(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| StorageError::Transaction(e.to_string()))?;
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
        let artifacts = self.table("artifacts");
        let readmes = self.table("readmes");
        let edges = self.table("edges");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StorageError::Transaction(e.to_string()))?;

        let result = sqlx::query(&format!(
            "UPDATE {artifacts} SET size_mb = $1 WHERE id = $2 AND kind = $3"
        ))
        .bind(new_size_mb)
        .bind(id.as_str())
        .bind(kind.as_str())
        .execute(&mut *tx)
        .await
        .map_err(|e| StorageError::backend(e.to_string()))?;
        if result.rows_affected() == 0 {
            return Ok(false);
        }

        if let Some(body) = readme {
            sqlx::query(&format!(
                "INSERT INTO {readmes} (id, kind, body) VALUES ($1, $2, $3)
                 ON CONFLICT (id, kind) DO UPDATE SET body = EXCLUDED.body"
            ))
            .bind(id.as_str())
            .bind(kind.as_str())
            .bind(body)
            .execute(&mut *tx)
            .await
            .map_err(|e| StorageError::backend(e.to_string()))?;
        }

        if kind == Kind::Model {
            sqlx::query(&format!("DELETE FROM {edges} WHERE src_id = $1"))
                .bind(id.as_str())
                .execute(&mut *tx)
                .await
                .map_err(|e| StorageError::backend(e.to_string()))?;

            let row = sqlx::query(&format!(
                "SELECT id, kind, name, url, size_mb, download_url FROM {artifacts}
                 WHERE id = $1 AND kind = $2"
            ))
            .bind(id.as_str())
            .bind(kind.as_str())
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| StorageError::backend(e.to_string()))?;
            let artifact = Self::row_to_artifact(&row)?;
            self.insert_edges(&mut tx, &artifact, linked).await?;
        }

        tx.commit()
            .await
            .map_err(|e| StorageError::Transaction(e.to_string()))?;
        Ok(true)
    }

    async fn get_by_id(&self, id: &ArtifactId, kind: Kind) -> StorageResult<Option<Artifact>> {
        let artifacts = self.table("artifacts");
        let row = sqlx::query(&format!(
            "SELECT id, kind, name, url, size_mb, download_url FROM {artifacts}
             WHERE id = $1 AND kind = $2"
        ))
        .bind(id.as_str())
        .bind(kind.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::backend(e.to_string()))?;
        row.map(|r| Self::row_to_artifact(&r)).transpose()
    }

    async fn exists(&self, id: &ArtifactId, kind: Kind) -> StorageResult<bool> {
        let artifacts = self.table("artifacts");
        let row = sqlx::query(&format!(
            "SELECT 1 FROM {artifacts} WHERE id = $1 AND kind = $2"
        ))
        .bind(id.as_str())
        .bind(kind.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::backend(e.to_string()))?;
        Ok(row.is_some())
    }

    async fn get_by_name(&self, name: &str) -> StorageResult<Vec<Artifact>> {
        let artifacts = self.table("artifacts");
        let rows = sqlx::query(&format!(
            "SELECT id, kind, name, url, size_mb, download_url FROM {artifacts} WHERE name = $1"
        ))
        .bind(name)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::backend(e.to_string()))?;
        rows.iter().map(Self::row_to_artifact).collect()
    }

    async fn get_by_regex(&self, pattern: &str) -> StorageResult<Vec<Artifact>> {
        let artifacts = self.table("artifacts");
        let readmes = self.table("readmes");
        let rows = sqlx::query(&format!(
            "SELECT DISTINCT a.id, a.kind, a.name, a.url, a.size_mb, a.download_url
             FROM {artifacts} a
             LEFT JOIN {readmes} r ON r.id = a.id AND r.kind = a.kind
             WHERE a.name ~ $1 OR r.body ~ $1"
        ))
        .bind(pattern)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::backend(e.to_string()))?;
        rows.iter().map(Self::row_to_artifact).collect()
    }

    async fn get_by_query(
        &self,
        query: &ArtifactQuery,
        offset: Option<&str>,
        page_size: usize,
    ) -> StorageResult<(Vec<Artifact>, Option<String>)> {
        let artifacts = self.table("artifacts");
        let kinds: Vec<&'static str> = query.kinds_or_default().iter().map(|k| k.as_str()).collect();
        let start: i64 = offset.and_then(|s| s.parse().ok()).unwrap_or(0);

        let rows = if query.matches_all_names() {
            sqlx::query(&format!(
                "SELECT id, kind, name, url, size_mb, download_url FROM {artifacts}
                 WHERE kind = ANY($1) ORDER BY id OFFSET $2 LIMIT $3"
            ))
            .bind(&kinds)
            .bind(start)
            .bind(page_size as i64 + 1)
            .fetch_all(&self.pool)
            .await
        } else {
            sqlx::query(&format!(
                "SELECT id, kind, name, url, size_mb, download_url FROM {artifacts}
                 WHERE name = $1 AND kind = ANY($2) ORDER BY id OFFSET $3 LIMIT $4"
            ))
            .bind(&query.name)
            .bind(&kinds)
            .bind(start)
            .bind(page_size as i64 + 1)
            .fetch_all(&self.pool)
            .await
        }
        .map_err(|e| StorageError::backend(e.to_string()))?;

        let has_more = rows.len() > page_size;
        let page_rows = if has_more { &rows[..page_size] } else { &rows[..] };
        let artifacts_out: StorageResult<Vec<Artifact>> =
            page_rows.iter().map(Self::row_to_artifact).collect();
        let next_offset = has_more.then(|| (start + page_size as i64).to_string());
        Ok((artifacts_out?, next_offset))
    }

    async fn get_readme(&self, id: &ArtifactId, kind: Kind) -> StorageResult<Option<ReadmeRecord>> {
        let readmes = self.table("readmes");
        let row = sqlx::query(&format!(
            "SELECT body FROM {readmes} WHERE id = $1 AND kind = $2"
        ))
        .bind(id.as_str())
        .bind(kind.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::backend(e.to_string()))?;
        Ok(row.map(|r| ReadmeRecord {
            id: id.clone(),
            kind,
            body: r.get("body"),
        }))
    }

    async fn insert_rating(&self, rating: &Rating) -> StorageResult<()> {
        let ratings = self.table("ratings");
        let metrics_json = serde_json::to_string(&rating.metrics)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        let size_breakdown_json = rating
            .size_breakdown
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        sqlx::query(&format!(
            "INSERT INTO {ratings} (model_id, net_score, metrics_json, size_breakdown_json)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (model_id) DO UPDATE SET
                net_score = EXCLUDED.net_score,
                metrics_json = EXCLUDED.metrics_json,
                size_breakdown_json = EXCLUDED.size_breakdown_json"
        ))
        .bind(rating.model_id.as_str())
        .bind(rating.net_score)
        .bind(metrics_json)
        .bind(size_breakdown_json)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::backend(e.to_string()))?;
        Ok(())
    }

    async fn get_rating(&self, model_id: &ArtifactId) -> StorageResult<Option<Rating>> {
        let ratings = self.table("ratings");
        let row = sqlx::query(&format!(
            "SELECT net_score, metrics_json, size_breakdown_json FROM {ratings} WHERE model_id = $1"
        ))
        .bind(model_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::backend(e.to_string()))?;

        let Some(row) = row else { return Ok(None) };
        let metrics: Vec<MetricResult> = serde_json::from_str(row.get::<String, _>("metrics_json").as_str())
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        let size_breakdown: Option<DeploymentTargetScores> = row
            .get::<Option<String>, _>("size_breakdown_json")
            .map(|s| serde_json::from_str(&s))
            .transpose()
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        Ok(Some(Rating {
            model_id: model_id.clone(),
            metrics,
            net_score: row.get("net_score"),
            size_breakdown,
        }))
    }

    async fn get_outgoing_edges(&self, src_id: &ArtifactId) -> StorageResult<Vec<EdgeRecord>> {
        let edges = self.table("edges");
        let rows = sqlx::query(&format!("SELECT * FROM {edges} WHERE src_id = $1"))
            .bind(src_id.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::backend(e.to_string()))?;
        rows.iter().map(Self::row_to_edge).collect()
    }

    async fn get_incoming_edges(&self, dst_id: &ArtifactId) -> StorageResult<Vec<EdgeRecord>> {
        let edges = self.table("edges");
        let rows = sqlx::query(&format!("SELECT * FROM {edges} WHERE dst_id = $1"))
            .bind(dst_id.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::backend(e.to_string()))?;
        rows.iter().map(Self::row_to_edge).collect()
    }

    async fn reset(&self) -> StorageResult<()> {
        for table in ["edges", "ratings", "readmes", "artifacts"] {
            sqlx::query(&format!("TRUNCATE TABLE {}", self.table(table)))
                .execute(&self.pool)
                .await
                .map_err(|e| StorageError::backend(e.to_string()))?;
        }
        Ok(())
    }
}
