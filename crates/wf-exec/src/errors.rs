use thiserror::Error;
use wf_core::NodeError;
use wf_graph::{LoaderError, WorkflowError};
use wf_store::StoreError;

/// Top-level error surface exposed across the production/development
/// boundary. Every subsystem error composes into this via `#[from]` rather
/// than the caller matching on each crate's own enum.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    Load(#[from] LoaderError),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Node(#[from] NodeError),

    #[error("unknown node id: {0}")]
    UnknownNode(String),

    #[error("node {0} is not a producer")]
    NotAProducer(String),

    #[error("unresolved dependency: {0}")]
    UnresolvedDependency(String),
}
