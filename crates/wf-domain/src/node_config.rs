use crate::Pool;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeConfigError {
    #[error("node id must not be empty")]
    EmptyId,
}

/// Immutable per-node configuration. Once built, nothing mutates it; the
/// only way to get a changed `NodeConfig` is to build a new one (post
/// processors that need to rewrite form values do so via `with_form_value`,
/// which returns a fresh instance rather than taking `&mut self`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
    id: String,
    type_identifier: String,
    preferred_pool: Pool,
    config: IndexMap<String, Value>,
    form_values: IndexMap<String, Value>,
}

impl NodeConfig {
    pub fn new(id: impl Into<String>, type_identifier: impl Into<String>, preferred_pool: Pool, config: IndexMap<String, Value>, form_values: IndexMap<String, Value>) -> Result<Self, NodeConfigError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(NodeConfigError::EmptyId);
        }
        Ok(Self { id, type_identifier: type_identifier.into(), preferred_pool, config, form_values })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn type_identifier(&self) -> &str {
        &self.type_identifier
    }

    pub fn preferred_pool(&self) -> Pool {
        self.preferred_pool
    }

    pub fn config(&self) -> &IndexMap<String, Value> {
        &self.config
    }

    pub fn form_values(&self) -> &IndexMap<String, Value> {
        &self.form_values
    }

    pub fn form_value(&self, key: &str) -> Option<&Value> {
        self.form_values.get(key)
    }

    /// Returns a copy with one form value set or overwritten, leaving
    /// `self` untouched. Used by QueueLinker to rewrite the queue-name field
    /// without violating post-construction immutability.
    pub fn with_form_value(&self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut form_values = self.form_values.clone();
        form_values.insert(key.into(), value.into());
        Self { form_values, ..self.clone() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_id() {
        let err = NodeConfig::new("", "producer", Pool::Cooperative, IndexMap::new(), IndexMap::new()).unwrap_err();
        assert!(matches!(err, NodeConfigError::EmptyId));
    }

    #[test]
    fn with_form_value_is_non_mutating() {
        let cfg = NodeConfig::new("n1", "producer", Pool::Cooperative, IndexMap::new(), IndexMap::new()).unwrap();
        let updated = cfg.with_form_value("queue", "q_a_b");
        assert!(cfg.form_value("queue").is_none());
        assert_eq!(updated.form_value("queue").unwrap(), "q_a_b");
    }
}
