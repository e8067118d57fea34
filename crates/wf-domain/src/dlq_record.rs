use crate::DataEnvelope;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A failed node execution, captured with enough context to diagnose it
/// without the kernel retrying automatically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DlqRecord {
    pub node_id: String,
    pub envelope: DataEnvelope,
    pub error_kind: String,
    pub error_message: String,
    pub stack_text: String,
    pub timestamp_iso: DateTime<Utc>,
}

impl DlqRecord {
    pub fn new(node_id: impl Into<String>, envelope: DataEnvelope, error_kind: impl Into<String>, error_message: impl Into<String>, stack_text: impl Into<String>) -> Self {
        Self { node_id: node_id.into(), envelope, error_kind: error_kind.into(), error_message: error_message.into(), stack_text: stack_text.into(), timestamp_iso: Utc::now() }
    }

    /// Substituted for an entry that failed to deserialize, so one corrupt
    /// record in the queue doesn't stop `peek`/`pop_at` from returning the
    /// rest.
    pub fn placeholder(index: usize, raw_error: impl Into<String>) -> Self {
        Self { node_id: format!("<unreadable:{index}>"), envelope: DataEnvelope::new(), error_kind: "DecodeError".to_string(), error_message: raw_error.into(), stack_text: String::new(), timestamp_iso: Utc::now() }
    }
}
