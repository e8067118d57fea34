use thiserror::Error;

/// Error surface of a single node's `init`/`execute`. This is deliberately
/// narrow: the kernel doesn't know or care what a concrete node does
/// internally, only whether it was ready, whether it failed, and whether it
/// was cancelled (which bypasses the DLQ entirely).
#[derive(Debug, Error)]
pub enum NodeError {
    #[error("node not ready: {0}")]
    NotReady(String),

    /// `kind` becomes `DlqRecord::error_kind`; concrete nodes should pass
    /// something stable like the name of the failure variant they hit
    /// (`"ValueError"`, `"HttpError"`, ...), not a formatted message.
    #[error("{kind}: {message}")]
    Execution { kind: String, message: String },

    #[error("cancelled")]
    Cancelled,
}

impl NodeError {
    pub fn execution(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Execution { kind: kind.into(), message: message.into() }
    }

    pub fn error_kind(&self) -> &str {
        match self {
            NodeError::NotReady(_) => "NotReadyError",
            NodeError::Execution { kind, .. } => kind.as_str(),
            NodeError::Cancelled => "Cancelled",
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, NodeError::Cancelled)
    }
}
