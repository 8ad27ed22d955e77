//! In-process response cache, used in tests and when `cache.backend =
//! "memory"`.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::cache::error::CacheResult;
use crate::cache::traits::ResponseCache;

struct Entry {
    body: Vec<u8>,
    expires_at: Instant,
}

pub struct MemoryCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl ResponseCache for MemoryCache {
    async fn insert(&self, key: &str, body: Vec<u8>) -> CacheResult<()> {
        self.entries.write().await.insert(
            key.to_string(),
            Entry {
                body,
                expires_at: Instant::now() + self.ttl,
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        let mut entries = self.entries.write().await;
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Ok(Some(entry.body.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn delete_by_artifact(&self, artifact_id: &str, kind: &str) -> CacheResult<usize> {
        let prefix = crate::cache::fingerprint::invalidation_prefix(artifact_id, kind);
        let mut entries = self.entries.write().await;
        let matching: Vec<String> = entries
            .keys()
            .filter(|k| k.starts_with(&prefix))
            .cloned()
            .collect();
        for key in &matching {
            entries.remove(key);
        }
        Ok(matching.len())
    }

    async fn reset(&self) -> CacheResult<()> {
        self.entries.write().await.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_then_get() {
        let cache = MemoryCache::new(Duration::from_secs(60));
        cache.insert("k1", b"body".to_vec()).await.unwrap();
        assert_eq!(cache.get("k1").await.unwrap(), Some(b"body".to_vec()));
    }

    #[tokio::test]
    async fn expired_entry_is_a_miss() {
        let cache = MemoryCache::new(Duration::from_millis(1));
        cache.insert("k1", b"body".to_vec()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(cache.get("k1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn delete_by_artifact_is_prefix_scoped() {
        let cache = MemoryCache::new(Duration::from_secs(60));
        cache
            .insert("artifact:abc:model:h1", b"1".to_vec())
            .await
            .unwrap();
        cache
            .insert("artifact:abc:model:h2", b"2".to_vec())
            .await
            .unwrap();
        cache
            .insert("artifact:xyz:dataset:h3", b"3".to_vec())
            .await
            .unwrap();

        let removed = cache.delete_by_artifact("abc", "model").await.unwrap();
        assert_eq!(removed, 2);
        assert!(cache.get("artifact:xyz:dataset:h3").await.unwrap().is_some());
    }
}
