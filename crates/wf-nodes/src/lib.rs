//! wf-nodes: concrete node implementations covering all four kinds, plus a
//! queue-linked writer/reader pair used to demonstrate cross-loop hand-off.
//! Registers every node with `wf-registry` via `register_node!` as a side
//! effect of being linked into a binary.

mod counter_producer;
mod log_terminator;
mod queue_nodes;
mod shared_store;
mod threshold_router;
mod uppercase_transform;

pub use counter_producer::CounterProducer;
pub use log_terminator::LogTerminator;
pub use queue_nodes::{QueueReaderNode, QueueWriterNode};
pub use shared_store::{set_shared_store, shared_store};
pub use threshold_router::ThresholdRouter;
pub use uppercase_transform::UppercaseTransform;
