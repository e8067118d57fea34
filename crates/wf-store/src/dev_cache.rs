use crate::{DataStore, StoreError};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use wf_domain::DataEnvelope;

/// Keyed store of last node output, used for stepwise (development-mode)
/// execution. Backed by the same cache primitive `DataStore` exposes,
/// under its own key prefix, so a `RedisDataStore` backend gives DevCache
/// and the queue-linked nodes the same persistence guarantees for free.
pub struct DevCache {
    store: Arc<dyn DataStore>,
    // DataStore's cache has no "list keys" operation; DevCache tracks its
    // own ids so `clear_all` knows what to clear.
    known_ids: Mutex<HashSet<String>>,
}

fn key(id: &str) -> String {
    format!("dev:{id}")
}

impl DevCache {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store, known_ids: Mutex::new(HashSet::new()) }
    }

    pub async fn get(&self, id: &str) -> Result<Option<DataEnvelope>, StoreError> {
        self.store.cache_get(&key(id)).await
    }

    pub async fn set(&self, id: &str, env: DataEnvelope, ttl: Option<Duration>) -> Result<(), StoreError> {
        self.store.cache_set(&key(id), env, ttl).await?;
        self.known_ids.lock().await.insert(id.to_string());
        Ok(())
    }

    pub async fn has(&self, id: &str) -> Result<bool, StoreError> {
        self.store.cache_exists(&key(id)).await
    }

    pub async fn clear(&self, id: &str) -> Result<(), StoreError> {
        self.store.cache_del(&key(id)).await?;
        self.known_ids.lock().await.remove(id);
        Ok(())
    }

    pub async fn clear_all(&self) -> Result<(), StoreError> {
        let ids: Vec<String> = self.known_ids.lock().await.drain().collect();
        for id in ids {
            self.store.cache_del(&key(&id)).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryDataStore;

    #[tokio::test]
    async fn set_get_clear_roundtrip() {
        let cache = DevCache::new(Arc::new(InMemoryDataStore::new()));
        let mut env = DataEnvelope::new();
        env.set("x", 1);
        cache.set("node-a", env, None).await.unwrap();
        assert!(cache.has("node-a").await.unwrap());
        assert_eq!(cache.get("node-a").await.unwrap().unwrap().get("x").unwrap(), 1);
        cache.clear("node-a").await.unwrap();
        assert!(!cache.has("node-a").await.unwrap());
    }

    #[tokio::test]
    async fn clear_all_drops_every_known_id() {
        let cache = DevCache::new(Arc::new(InMemoryDataStore::new()));
        cache.set("a", DataEnvelope::new(), None).await.unwrap();
        cache.set("b", DataEnvelope::new(), None).await.unwrap();
        cache.clear_all().await.unwrap();
        assert!(!cache.has("a").await.unwrap());
        assert!(!cache.has("b").await.unwrap());
    }
}
