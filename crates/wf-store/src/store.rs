use crate::StoreError;
use async_trait::async_trait;
use std::time::Duration;
use wf_domain::DataEnvelope;

/// Async interface over a named-queue and cache service (C9). `RedisDataStore`
/// (the production backend) and `InMemoryDataStore` (used by development mode
/// and by every test in this workspace) both implement this, so FlowRunner and
/// the dev-mode Orchestrator never know which one they're talking to.
///
/// All keys are namespaced: queues under `ds:queue:<name>`, cache under
/// `ds:cache:<key>`. Implementations are expected to apply that prefix
/// themselves so the wire format is identical across backends.
#[async_trait]
pub trait DataStore: Send + Sync {
    async fn push(&self, queue_name: &str, envelope: DataEnvelope) -> Result<(), StoreError>;

    /// `timeout = None` waits indefinitely; `Some(Duration::ZERO)` is a
    /// single non-blocking attempt; otherwise waits up to the bound.
    /// Returns `Ok(None)` on timeout — that is "no work", not an error.
    async fn pop(&self, queue_name: &str, timeout: Option<Duration>) -> Result<Option<DataEnvelope>, StoreError>;

    async fn queue_length(&self, queue_name: &str) -> Result<usize, StoreError>;

    async fn cache_set(&self, key: &str, value: DataEnvelope, ttl: Option<Duration>) -> Result<(), StoreError>;
    async fn cache_get(&self, key: &str) -> Result<Option<DataEnvelope>, StoreError>;
    async fn cache_del(&self, key: &str) -> Result<(), StoreError>;
    async fn cache_exists(&self, key: &str) -> Result<bool, StoreError>;
}

pub fn queue_key(name: &str) -> String {
    format!("ds:queue:{name}")
}

pub fn cache_key(key: &str) -> String {
    format!("ds:cache:{key}")
}
