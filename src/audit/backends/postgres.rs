//! PostgreSQL-backed audit log (`audit.backend = "postgres"`).
//!
//! Schema is bootstrapped the same way as `crate::storage::backends::postgres`:
//! a schema-qualified `CREATE TABLE IF NOT EXISTS` on connect.

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::Row;
use std::str::FromStr;

use crate::audit::error::{AuditError, AuditResult};
use crate::audit::traits::AuditLog;
use crate::model::{Action, ArtifactId, AuditEntry, Kind};
use crate::storage::config::PostgresConfig;

pub struct PostgresAuditLog {
    pool: sqlx::PgPool,
    schema: String,
}

impl PostgresAuditLog {
    pub async fn connect(config: &PostgresConfig) -> AuditResult<Self> {
        let opts = PgConnectOptions::from_str(&config.connection_string)
            .map_err(|e| AuditError::Configuration(e.to_string()))?;
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.connection_timeout)
            .connect_with(opts)
            .await
            .map_err(|e| AuditError::Backend(e.to_string()))?;

        let log = Self {
            pool,
            schema: config.schema.clone(),
        };
        log.ensure_schema().await?;
        Ok(log)
    }

    fn table(&self) -> String {
        format!("{}.audit_log", self.schema)
    }

    async fn ensure_schema(&self) -> AuditResult<()> {
        sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {}", self.schema))
            .execute(&self.pool)
            .await
            .map_err(|e| AuditError::Backend(e.to_string()))?;

        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id TEXT PRIMARY KEY,
                artifact_id TEXT NOT NULL,
                kind TEXT NOT NULL,
                name TEXT NOT NULL,
                actor TEXT NOT NULL,
                ts TIMESTAMPTZ NOT NULL,
                action TEXT NOT NULL
            )",
            self.table()
        ))
        .execute(&self.pool)
        .await
        .map_err(|e| AuditError::Backend(e.to_string()))?;

        sqlx::query(&format!(
            "CREATE INDEX IF NOT EXISTS idx_{schema}_audit_artifact ON {table} (artifact_id, kind)",
            schema = self.schema,
            table = self.table(),
        ))
        .execute(&self.pool)
        .await
        .map_err(|e| AuditError::Backend(e.to_string()))?;
        Ok(())
    }

    fn parse_action(s: &str) -> AuditResult<Action> {
        match s {
            "CREATE" => Ok(Action::Create),
            "UPDATE" => Ok(Action::Update),
            "DOWNLOAD" => Ok(Action::Download),
            "RATE" => Ok(Action::Rate),
            "AUDIT" => Ok(Action::Audit),
            other => Err(AuditError::Backend(format!("unknown audit action {other}"))),
        }
    }
}

#[async_trait]
impl AuditLog for PostgresAuditLog {
    async fn append(&self, entry: AuditEntry) -> AuditResult<bool> {
        let result = sqlx::query(&format!(
            "INSERT INTO {} (id, artifact_id, kind, name, actor, ts, action)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             ON CONFLICT (id) DO NOTHING",
            self.table()
        ))
        .bind(&entry.id)
        .bind(entry.artifact_id.as_str())
        .bind(entry.kind.as_str())
        .bind(&entry.name)
        .bind(&entry.actor)
        .bind(entry.timestamp)
        .bind(entry.action.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| AuditError::Backend(e.to_string()))?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_by_artifact(&self, id: &ArtifactId, kind: Kind) -> AuditResult<Option<Vec<AuditEntry>>> {
        let rows = sqlx::query(&format!(
            "SELECT id, artifact_id, kind, name, actor, ts, action FROM {}
             WHERE artifact_id = $1 AND kind = $2 ORDER BY ts ASC",
            self.table()
        ))
        .bind(id.as_str())
        .bind(kind.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AuditError::Backend(e.to_string()))?;

        if rows.is_empty() {
            return Ok(None);
        }

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            let kind = Kind::from_str(&row.get::<String, _>("kind"))
                .map_err(|e| AuditError::Backend(e.to_string()))?;
            entries.push(AuditEntry {
                id: row.get("id"),
                artifact_id: ArtifactId::parse(row.get::<String, _>("artifact_id"))
                    .expect("stored id is valid"),
                kind,
                name: row.get("name"),
                actor: row.get("actor"),
                timestamp: row.get("ts"),
                action: Self::parse_action(&row.get::<String, _>("action"))?,
            });
        }
        Ok(Some(entries))
    }

    async fn reset(&self) -> AuditResult<()> {
        sqlx::query(&format!("TRUNCATE TABLE {}", self.table()))
            .execute(&self.pool)
            .await
            .map_err(|e| AuditError::Backend(e.to_string()))?;
        Ok(())
    }
}
