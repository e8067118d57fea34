//! wf-graph: the typed DAG (C6), its JSON loader (C7), and the
//! post-processing passes that run over a freshly loaded graph (C8).

mod errors;
mod graph;
mod loader;
mod postprocess;

pub use errors::{GraphError, LoaderError, WorkflowError};
pub use graph::{NodeIndex, WorkflowGraph, WorkflowNode};
pub use loader::load_workflow;
pub use postprocess::{default_post_processors, run_post_processors, PostProcessor, QueueLinker, ReadinessValidator};
