use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("node id '{0}' already exists")]
    DuplicateNode(String),

    #[error("node id '{0}' not found")]
    UnknownNode(String),
}

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("failed to parse workflow document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    NodeConfig(#[from] wf_domain::NodeConfigError),
}

/// Aggregates everything that can go wrong between handing the loader raw
/// JSON and having a post-processed, runnable graph.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Loader(#[from] LoaderError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    /// Rendered multi-node error report from post-processing (readiness
    /// failures, unknown identifiers inside a strict context, etc).
    #[error("workflow invalid:\n{0}")]
    Invalid(String),
}
