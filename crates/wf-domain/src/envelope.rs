use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Payload that flows between nodes in a chain.
///
/// Deep-copyable by derive(Clone); equality is structural, matching the
/// invariant that an envelope is never shared by reference across a pool
/// boundary — each dispatch owns its own copy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataEnvelope {
    data: IndexMap<String, Value>,
    metadata: IndexMap<String, Value>,
}

impl DataEnvelope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(data: IndexMap<String, Value>) -> Self {
        Self { data, metadata: IndexMap::new() }
    }

    pub fn data(&self) -> &IndexMap<String, Value> {
        &self.data
    }

    pub fn metadata(&self) -> &IndexMap<String, Value> {
        &self.metadata
    }

    pub fn data_mut(&mut self) -> &mut IndexMap<String, Value> {
        &mut self.data
    }

    pub fn metadata_mut(&mut self) -> &mut IndexMap<String, Value> {
        &mut self.metadata
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.data.insert(key.into(), value.into());
    }

    pub fn set_meta(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.metadata.insert(key.into(), value.into());
    }
}
