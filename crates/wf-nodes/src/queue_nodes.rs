use crate::shared_store::shared_store;
use async_trait::async_trait;
use wf_core::{AnyNode, NodeBase, NodeError, NonBlockingNode, ProducerNode, ProducerOutput, QueueRole};
use wf_domain::{DataEnvelope, NodeConfig, Pool};
use wf_registry::{register_node, NodeFactory};
use wf_store::DataStore;

fn queue_name(config: &NodeConfig) -> Result<String, NodeError> {
    config.form_value("queue").and_then(|v| v.as_str()).map(str::to_string).ok_or_else(|| NodeError::NotReady("queue name not configured; QueueLinker should have derived or validated one".to_string()))
}

/// `NonBlocking` side of a loop hand-off: pushes the envelope onto a named
/// queue and ends the iteration. Paired with [`QueueReaderNode`] by
/// `QueueLinker` when both sides leave the queue name at its default.
pub struct QueueWriterNode {
    queue: String,
    store: std::sync::Arc<dyn DataStore>,
}

impl QueueWriterNode {
    fn from_config(config: &NodeConfig) -> Result<Self, NodeError> {
        Ok(Self { queue: queue_name(config)?, store: shared_store() })
    }
}

#[async_trait]
impl NodeBase for QueueWriterNode {
    fn identifier(&self) -> &'static str {
        "queue-writer"
    }

    fn preferred_pool(&self) -> Pool {
        Pool::Cooperative
    }

    fn queue_role(&self) -> Option<QueueRole> {
        Some(QueueRole::Writer)
    }
}

#[async_trait]
impl NonBlockingNode for QueueWriterNode {
    async fn execute(&mut self, env: DataEnvelope) -> Result<DataEnvelope, NodeError> {
        self.store.push(&self.queue, env.clone()).await.map_err(|e| NodeError::execution("StoreError", e.to_string()))?;
        Ok(env)
    }
}

/// `Producer` side of the same hand-off: blocks (indefinitely, per
/// `DataStore::pop`'s `None` timeout) until an item is available on the
/// named queue, then starts a new iteration with it.
pub struct QueueReaderNode {
    queue: String,
    store: std::sync::Arc<dyn DataStore>,
}

impl QueueReaderNode {
    fn from_config(config: &NodeConfig) -> Result<Self, NodeError> {
        Ok(Self { queue: queue_name(config)?, store: shared_store() })
    }
}

#[async_trait]
impl NodeBase for QueueReaderNode {
    fn identifier(&self) -> &'static str {
        "queue-reader"
    }

    fn preferred_pool(&self) -> Pool {
        Pool::Cooperative
    }

    fn queue_role(&self) -> Option<QueueRole> {
        Some(QueueRole::Reader)
    }
}

#[async_trait]
impl ProducerNode for QueueReaderNode {
    async fn execute(&mut self, _env: DataEnvelope) -> Result<ProducerOutput, NodeError> {
        let item = self.store.pop(&self.queue, None).await.map_err(|e| NodeError::execution("StoreError", e.to_string()))?;
        match item {
            Some(env) => Ok(ProducerOutput::Envelope(env)),
            None => Err(NodeError::NotReady("queue pop returned no item despite an indefinite wait".to_string())),
        }
    }
}

register_node!(NodeFactory {
    identifier: "queue-writer",
    construct: |cfg| match QueueWriterNode::from_config(cfg) {
        Ok(node) => AnyNode::NonBlocking(Box::new(node)),
        Err(_) => AnyNode::NonBlocking(Box::new(UnconfiguredWriter)),
    }
});
register_node!(NodeFactory {
    identifier: "queue-reader",
    construct: |cfg| match QueueReaderNode::from_config(cfg) {
        Ok(node) => AnyNode::Producer(Box::new(node)),
        Err(_) => AnyNode::Producer(Box::new(UnconfiguredReader)),
    }
});

/// Stand-in returned when a queue node's config is missing a queue name at
/// construction time (the factory signature is infallible); `init` surfaces
/// the real error so `ReadinessValidator` still catches it before any
/// runner starts.
struct UnconfiguredWriter;
#[async_trait]
impl NodeBase for UnconfiguredWriter {
    fn identifier(&self) -> &'static str {
        "queue-writer"
    }
    fn preferred_pool(&self) -> Pool {
        Pool::Cooperative
    }
}
#[async_trait]
impl NonBlockingNode for UnconfiguredWriter {
    async fn init(&mut self) -> Result<(), NodeError> {
        Err(NodeError::NotReady("queue name not configured".to_string()))
    }
    async fn execute(&mut self, _env: DataEnvelope) -> Result<DataEnvelope, NodeError> {
        Err(NodeError::NotReady("queue name not configured".to_string()))
    }
}

struct UnconfiguredReader;
#[async_trait]
impl NodeBase for UnconfiguredReader {
    fn identifier(&self) -> &'static str {
        "queue-reader"
    }
    fn preferred_pool(&self) -> Pool {
        Pool::Cooperative
    }
}
#[async_trait]
impl ProducerNode for UnconfiguredReader {
    async fn init(&mut self) -> Result<(), NodeError> {
        Err(NodeError::NotReady("queue name not configured".to_string()))
    }
    async fn execute(&mut self, _env: DataEnvelope) -> Result<ProducerOutput, NodeError> {
        Err(NodeError::NotReady("queue name not configured".to_string()))
    }
}
