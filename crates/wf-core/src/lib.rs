//! wf-core: the neutral node-kind contracts (C3) every concrete node
//! implements, independent of the graph that wires nodes together
//! (wf-graph) and the scheduler that drives them (wf-exec).

mod errors;
mod node;

pub use errors::NodeError;
pub use node::{AnyNode, BlockingNode, LogicalNode, NodeBase, NodeKind, NonBlockingNode, ProducerNode, ProducerOutput, QueueRole};
