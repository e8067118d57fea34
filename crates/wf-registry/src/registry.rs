use crate::{NodeFactory, RegistryError};
use std::collections::HashMap;
use wf_core::AnyNode;
use wf_domain::NodeConfig;

/// `type_identifier -> factory` map. Built once at startup from whatever
/// `inventory::submit!`-ed factories the linked binary contains; reads
/// after that are lock-free (Section 5).
pub struct NodeRegistry {
    factories: HashMap<&'static str, &'static NodeFactory>,
}

impl NodeRegistry {
    /// Walks every `NodeFactory` collected by `inventory` and builds the
    /// identifier map. Fails if two factories claim the same identifier.
    pub fn discover() -> Result<Self, RegistryError> {
        let mut factories: HashMap<&'static str, &'static NodeFactory> = HashMap::new();
        let mut duplicates: Vec<String> = Vec::new();
        for factory in inventory::iter::<NodeFactory> {
            if factories.insert(factory.identifier, factory).is_some() {
                duplicates.push(factory.identifier.to_string());
            }
        }
        if !duplicates.is_empty() {
            return Err(RegistryError::DuplicateIdentifier(duplicates));
        }
        tracing::info!(count = factories.len(), "discovered node factories");
        Ok(Self { factories })
    }

    pub fn empty() -> Self {
        Self { factories: HashMap::new() }
    }

    /// Explicit registration path for tests that want one factory without
    /// going through `inventory::iter`.
    pub fn register(&mut self, factory: &'static NodeFactory) -> Result<(), RegistryError> {
        if self.factories.contains_key(factory.identifier) {
            return Err(RegistryError::DuplicateIdentifier(vec![factory.identifier.to_string()]));
        }
        self.factories.insert(factory.identifier, factory);
        Ok(())
    }

    /// Returns `None` for an unregistered identifier; the loader logs a
    /// warning and omits the node rather than treating this as fatal.
    pub fn create(&self, config: &NodeConfig) -> Option<AnyNode> {
        self.factories.get(config.type_identifier()).map(|factory| (factory.construct)(config))
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.factories.contains_key(identifier)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use wf_core::{NodeBase, NonBlockingNode};
    use wf_domain::Pool;

    struct Noop;
    #[async_trait::async_trait]
    impl NodeBase for Noop {
        fn identifier(&self) -> &'static str {
            "noop-terminator"
        }
        fn preferred_pool(&self) -> Pool {
            Pool::Cooperative
        }
    }
    #[async_trait::async_trait]
    impl NonBlockingNode for Noop {
        async fn execute(&mut self, env: wf_domain::DataEnvelope) -> Result<wf_domain::DataEnvelope, wf_core::NodeError> {
            Ok(env)
        }
    }

    static NOOP_FACTORY: NodeFactory = NodeFactory { identifier: "noop-terminator", construct: |_cfg| AnyNode::NonBlocking(Box::new(Noop)) };

    #[test]
    fn explicit_register_and_create() {
        let mut registry = NodeRegistry::empty();
        registry.register(&NOOP_FACTORY).unwrap();
        assert!(registry.contains("noop-terminator"));

        let cfg = NodeConfig::new("n1", "noop-terminator", Pool::Cooperative, IndexMap::new(), IndexMap::new()).unwrap();
        let node = registry.create(&cfg).unwrap();
        assert_eq!(node.identifier(), "noop-terminator");

        assert!(registry.create(&NodeConfig::new("n2", "unknown-type", Pool::Cooperative, IndexMap::new(), IndexMap::new()).unwrap()).is_none());
    }

    #[test]
    fn duplicate_register_fails() {
        let mut registry = NodeRegistry::empty();
        registry.register(&NOOP_FACTORY).unwrap();
        let err = registry.register(&NOOP_FACTORY).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateIdentifier(_)));
    }
}
