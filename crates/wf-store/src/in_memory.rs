use crate::store::{cache_key, queue_key};
use crate::{DataStore, StoreError};
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, Notify};
use wf_domain::DataEnvelope;

struct CacheEntry {
    value: DataEnvelope,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Instant::now() >= at)
    }
}

/// In-process `DataStore` backing development-mode execution and this
/// workspace's tests. Queue semantics match the external-service contract:
/// push-left, blocking-pop-right, one message delivered to exactly one
/// waiter. Cache entries lazily expire on read, same as a real TTL-backed
/// store would appear to a reader who doesn't poll actively.
#[derive(Default)]
pub struct InMemoryDataStore {
    queues: Mutex<HashMap<String, VecDeque<DataEnvelope>>>,
    notifiers: Mutex<HashMap<String, Arc<Notify>>>,
    cache: DashMap<String, CacheEntry>,
}

impl InMemoryDataStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn notifier_for(&self, key: &str) -> Arc<Notify> {
        let mut notifiers = self.notifiers.lock().await;
        notifiers.entry(key.to_string()).or_insert_with(|| Arc::new(Notify::new())).clone()
    }

    async fn try_pop(&self, key: &str) -> Option<DataEnvelope> {
        let mut queues = self.queues.lock().await;
        queues.get_mut(key).and_then(VecDeque::pop_back)
    }
}

#[async_trait]
impl DataStore for InMemoryDataStore {
    async fn push(&self, queue_name: &str, envelope: DataEnvelope) -> Result<(), StoreError> {
        let key = queue_key(queue_name);
        {
            let mut queues = self.queues.lock().await;
            queues.entry(key.clone()).or_default().push_front(envelope);
        }
        tracing::debug!(queue = %key, "pushed envelope");
        self.notifier_for(&key).await.notify_one();
        Ok(())
    }

    async fn pop(&self, queue_name: &str, timeout: Option<Duration>) -> Result<Option<DataEnvelope>, StoreError> {
        let key = queue_key(queue_name);

        if let Some(env) = self.try_pop(&key).await {
            return Ok(Some(env));
        }

        let result = match timeout {
            Some(d) if d.is_zero() => Ok(None),
            Some(d) => {
                let notify = self.notifier_for(&key).await;
                match tokio::time::timeout(d, notify.notified()).await {
                    Ok(()) => Ok(self.try_pop(&key).await),
                    Err(_) => Ok(None),
                }
            }
            None => {
                let notify = self.notifier_for(&key).await;
                loop {
                    notify.notified().await;
                    if let Some(env) = self.try_pop(&key).await {
                        return Ok(Some(env));
                    }
                }
            }
        };
        if matches!(result, Ok(None)) {
            tracing::debug!(queue = %key, "pop timed out with no message");
        }
        result
    }

    async fn queue_length(&self, queue_name: &str) -> Result<usize, StoreError> {
        let key = queue_key(queue_name);
        let queues = self.queues.lock().await;
        Ok(queues.get(&key).map(VecDeque::len).unwrap_or(0))
    }

    async fn cache_set(&self, key: &str, value: DataEnvelope, ttl: Option<Duration>) -> Result<(), StoreError> {
        let key = cache_key(key);
        self.cache.insert(key, CacheEntry { value, expires_at: ttl.map(|d| Instant::now() + d) });
        Ok(())
    }

    async fn cache_get(&self, key: &str) -> Result<Option<DataEnvelope>, StoreError> {
        let key = cache_key(key);
        match self.cache.get(&key) {
            Some(entry) if entry.is_expired() => {
                drop(entry);
                self.cache.remove(&key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    async fn cache_del(&self, key: &str) -> Result<(), StoreError> {
        self.cache.remove(&cache_key(key));
        Ok(())
    }

    async fn cache_exists(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.cache_get(key).await?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn push_then_pop_is_fifo_across_producers() {
        let store = InMemoryDataStore::new();
        let mut e1 = DataEnvelope::new();
        e1.set("n", 1);
        let mut e2 = DataEnvelope::new();
        e2.set("n", 2);
        store.push("q", e1).await.unwrap();
        store.push("q", e2).await.unwrap();

        let first = store.pop("q", Some(Duration::ZERO)).await.unwrap().unwrap();
        assert_eq!(first.get("n").unwrap(), 1);
        let second = store.pop("q", Some(Duration::ZERO)).await.unwrap().unwrap();
        assert_eq!(second.get("n").unwrap(), 2);
    }

    #[tokio::test]
    async fn non_blocking_pop_returns_none_on_empty() {
        let store = InMemoryDataStore::new();
        assert!(store.pop("empty", Some(Duration::ZERO)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn cache_ttl_expires() {
        let store = InMemoryDataStore::new();
        store.cache_set("k", DataEnvelope::new(), Some(Duration::from_millis(10))).await.unwrap();
        assert!(store.cache_exists("k").await.unwrap());
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(!store.cache_exists("k").await.unwrap());
    }

    #[tokio::test]
    async fn bounded_pop_wakes_on_push() {
        let store = Arc::new(InMemoryDataStore::new());
        let waiter = store.clone();
        let handle = tokio::spawn(async move { waiter.pop("q", Some(Duration::from_secs(2))).await.unwrap() });
        tokio::time::sleep(Duration::from_millis(20)).await;
        let mut env = DataEnvelope::new();
        env.set("ok", true);
        store.push("q", env).await.unwrap();
        let popped = handle.await.unwrap();
        assert_eq!(popped.unwrap().get("ok").unwrap(), true);
    }
}
