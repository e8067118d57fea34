use crate::NodeError;
use async_trait::async_trait;
use wf_domain::{BranchKey, DataEnvelope, Pool};
use wf_forms::FormSpec;

/// Output of a Producer's execute. `Complete` is the `ExecutionComplete`
/// sentinel from 4.1: it halts the owning FlowRunner's loop rather than
/// starting another iteration.
pub enum ProducerOutput {
    Envelope(DataEnvelope),
    Complete,
}

/// The neutral part of every node kind: identity, pool preference, an
/// optional config form, and teardown. Kept object-safe and
/// kind-independent on purpose — the kernel holds `Box<dyn NodeBase>`-ish
/// values only through the kind-specific traits below, never through this
/// one alone, but every one of those traits extends it.
#[async_trait]
pub trait NodeBase: Send + Sync {
    /// Stable, kebab-case identifier this node's factory is registered
    /// under.
    fn identifier(&self) -> &'static str;

    fn preferred_pool(&self) -> Pool;

    fn form_spec(&self) -> Option<&FormSpec> {
        None
    }

    /// `Some` only for queue-writer/queue-reader nodes; see [`QueueRole`].
    fn queue_role(&self) -> Option<QueueRole> {
        None
    }

    async fn cleanup(&mut self) {}
}

/// Invoked at the start of every iteration of its owning loop.
#[async_trait]
pub trait ProducerNode: NodeBase {
    async fn init(&mut self) -> Result<(), NodeError> {
        Ok(())
    }

    async fn execute(&mut self, env: DataEnvelope) -> Result<ProducerOutput, NodeError>;
}

/// Transforms an envelope; the loop awaits it (and any transitively
/// blocking downstream) before continuing.
#[async_trait]
pub trait BlockingNode: NodeBase {
    async fn init(&mut self) -> Result<(), NodeError> {
        Ok(())
    }

    async fn execute(&mut self, env: DataEnvelope) -> Result<DataEnvelope, NodeError>;
}

/// Marks the end of an iteration. The contract is semantic, not
/// concurrency-related: after this node returns, control returns to the
/// producer.
#[async_trait]
pub trait NonBlockingNode: NodeBase {
    async fn init(&mut self) -> Result<(), NodeError> {
        Ok(())
    }

    async fn execute(&mut self, env: DataEnvelope) -> Result<DataEnvelope, NodeError>;
}

/// A Blocking node that also routes: after `execute` returns, the
/// FlowRunner reads `branch_label` to pick the outgoing edge. `LogicalNode`
/// is a supertrait of `BlockingNode` rather than a separate kind, so a
/// Logical node is usable anywhere a Blocking one is expected.
#[async_trait]
pub trait LogicalNode: BlockingNode {
    /// Valid only immediately after `execute` returns; reflects the branch
    /// that execution took.
    fn branch_label(&self) -> Option<BranchKey>;
}

/// Which of the four contracts a concrete node satisfies. Graph vertices
/// and the registry both need to know this without downcasting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Producer,
    Blocking,
    NonBlocking,
    Logical,
}

/// A node of any kind, held behind the trait appropriate to it. The graph
/// stores one of these per vertex so a single `Vec` can mix producers,
/// blocking transforms, terminators, and logical routers.
pub enum AnyNode {
    Producer(Box<dyn ProducerNode>),
    Blocking(Box<dyn BlockingNode>),
    NonBlocking(Box<dyn NonBlockingNode>),
    Logical(Box<dyn LogicalNode>),
}

impl AnyNode {
    pub fn kind(&self) -> NodeKind {
        match self {
            AnyNode::Producer(_) => NodeKind::Producer,
            AnyNode::Blocking(_) => NodeKind::Blocking,
            AnyNode::NonBlocking(_) => NodeKind::NonBlocking,
            AnyNode::Logical(_) => NodeKind::Logical,
        }
    }

    pub fn identifier(&self) -> &'static str {
        match self {
            AnyNode::Producer(n) => n.identifier(),
            AnyNode::Blocking(n) => n.identifier(),
            AnyNode::NonBlocking(n) => n.identifier(),
            AnyNode::Logical(n) => n.identifier(),
        }
    }

    pub fn preferred_pool(&self) -> Pool {
        match self {
            AnyNode::Producer(n) => n.preferred_pool(),
            AnyNode::Blocking(n) => n.preferred_pool(),
            AnyNode::NonBlocking(n) => n.preferred_pool(),
            AnyNode::Logical(n) => n.preferred_pool(),
        }
    }

    pub fn is_non_blocking(&self) -> bool {
        matches!(self, AnyNode::NonBlocking(_))
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, AnyNode::Logical(_))
    }

    pub fn queue_role(&self) -> Option<QueueRole> {
        match self {
            AnyNode::Producer(n) => n.queue_role(),
            AnyNode::Blocking(n) => n.queue_role(),
            AnyNode::NonBlocking(n) => n.queue_role(),
            AnyNode::Logical(n) => n.queue_role(),
        }
    }

    /// Runs whichever kind's `init` applies. Used by the ReadinessValidator
    /// post-processor, which doesn't care which kind it's validating.
    pub async fn init(&mut self) -> Result<(), NodeError> {
        match self {
            AnyNode::Producer(n) => n.init().await,
            AnyNode::Blocking(n) => n.init().await,
            AnyNode::NonBlocking(n) => n.init().await,
            AnyNode::Logical(n) => n.init().await,
        }
    }
}

/// Marks a concrete node as one side of a queue hand-off so the
/// QueueLinker post-processor can find (writer, reader) pairs without
/// downcasting trait objects. `None` (the default) means "not a queue
/// node".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueRole {
    Writer,
    Reader,
}

#[cfg(test)]
mod tests {
    use super::*;

    struct DoubleX;

    #[async_trait]
    impl NodeBase for DoubleX {
        fn identifier(&self) -> &'static str {
            "double-x"
        }
        fn preferred_pool(&self) -> Pool {
            Pool::Cooperative
        }
    }

    #[async_trait]
    impl BlockingNode for DoubleX {
        async fn execute(&mut self, mut env: DataEnvelope) -> Result<DataEnvelope, NodeError> {
            let x = env.get("x").and_then(|v| v.as_i64()).unwrap_or(0);
            env.set("x", x * 2);
            Ok(env)
        }
    }

    #[tokio::test]
    async fn blocking_node_transforms_envelope() {
        let mut node: Box<dyn BlockingNode> = Box::new(DoubleX);
        let mut env = DataEnvelope::new();
        env.set("x", 1);
        let out = node.execute(env).await.unwrap();
        assert_eq!(out.get("x").unwrap(), 2);

        let any = AnyNode::Blocking(node);
        assert_eq!(any.kind(), NodeKind::Blocking);
        assert_eq!(any.identifier(), "double-x");
    }
}
