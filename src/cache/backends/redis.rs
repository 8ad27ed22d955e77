//! Redis-compatible response cache backend (`cache.backend = "redis"`,
//! production default).

use async_trait::async_trait;
use deadpool_redis::{redis::AsyncCommands, Config, Pool, Runtime};
use std::time::Duration;

use crate::cache::config::RedisConfig;
use crate::cache::error::{CacheError, CacheResult};
use crate::cache::traits::ResponseCache;

pub struct RedisCache {
    pool: Pool,
    ttl: Duration,
}

impl RedisCache {
    pub fn connect(config: &RedisConfig, ttl: Duration) -> CacheResult<Self> {
        let url = match &config.password {
            Some(password) => format!("redis://:{password}@{}:{}", config.host, config.port),
            None => format!("redis://{}:{}", config.host, config.port),
        };
        let pool = Config::from_url(url)
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| CacheError::Configuration(e.to_string()))?;
        Ok(Self { pool, ttl })
    }
}

#[async_trait]
impl ResponseCache for RedisCache {
    async fn insert(&self, key: &str, body: Vec<u8>) -> CacheResult<()> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))?;
        conn.set_ex::<_, _, ()>(key, body, self.ttl.as_secs().max(1))
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))
    }

    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))?;
        conn.get(key).await.map_err(|e| CacheError::Backend(e.to_string()))
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))?;
        conn.del::<_, ()>(key)
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))
    }

    async fn delete_by_artifact(&self, artifact_id: &str, kind: &str) -> CacheResult<usize> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))?;
        let pattern = format!(
            "{}*",
            crate::cache::fingerprint::invalidation_prefix(artifact_id, kind)
        );

        let mut matching: Vec<String> = Vec::new();
        let mut cursor: u64 = 0;
        loop {
            let (next_cursor, batch): (u64, Vec<String>) = deadpool_redis::redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(200)
                .query_async(&mut conn)
                .await
                .map_err(|e| CacheError::Backend(e.to_string()))?;
            matching.extend(batch);
            if next_cursor == 0 {
                break;
            }
            cursor = next_cursor;
        }

        if matching.is_empty() {
            return Ok(0);
        }
        conn.del::<_, ()>(&matching)
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))?;
        Ok(matching.len())
    }

    async fn reset(&self) -> CacheResult<()> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))?;
        deadpool_redis::redis::cmd("FLUSHDB")
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))
    }
}
