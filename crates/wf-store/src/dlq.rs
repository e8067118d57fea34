use tokio::sync::Mutex;
use wf_domain::{DataEnvelope, DlqRecord};
use wf_core::NodeError;

/// Dead-letter sink for failed executions. Positionally indexable
/// (`pop_at`), unlike the FIFO queue primitive `DataStore` exposes — the
/// source's Redis-backed DLQ is a `LIST` read with `LRANGE`/`LINDEX`, which
/// this mirrors with a plain indexed `Vec` rather than forcing position
/// lookups through `DataStore`'s push/pop-only contract.
#[derive(Default)]
pub struct Dlq {
    records: Mutex<Vec<DlqRecord>>,
}

impl Dlq {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push(&self, node_id: &str, envelope: DataEnvelope, err: &NodeError) {
        if err.is_cancelled() {
            // Cancellation bypasses the DLQ entirely (Section 7).
            return;
        }
        let record = DlqRecord::new(node_id, envelope, err.error_kind(), err.to_string(), stack_text(err));
        tracing::warn!(node_id, error_kind = %record.error_kind, "routed failed execution to dead-letter queue");
        self.records.lock().await.push(record);
    }

    pub async fn peek(&self, limit: usize) -> Vec<DlqRecord> {
        self.records.lock().await.iter().take(limit).cloned().collect()
    }

    pub async fn length(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn pop_at(&self, index: usize) -> Option<DlqRecord> {
        let mut records = self.records.lock().await;
        if index < records.len() {
            Some(records.remove(index))
        } else {
            None
        }
    }

    pub async fn clear(&self) {
        self.records.lock().await.clear();
    }
}

/// Rust has no interpreter traceback; this renders the `source()` chain of
/// the originating error as the nearest equivalent of `stack_text`.
fn stack_text(err: &NodeError) -> String {
    use std::error::Error;
    let mut out = format!("{err}");
    let mut cause = err.source();
    while let Some(e) = cause {
        out.push_str(&format!("\ncaused by: {e}"));
        cause = e.source();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn push_and_peek_preserve_node_id_and_message() {
        let dlq = Dlq::new();
        let err = NodeError::execution("ValueError", "boom");
        dlq.push("n1", DataEnvelope::new(), &err).await;
        let records = dlq.peek(10).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].node_id, "n1");
        assert_eq!(records[0].error_kind, "ValueError");
        assert_eq!(records[0].error_message, "boom");
        assert!(!records[0].stack_text.is_empty());
    }

    #[tokio::test]
    async fn cancelled_bypasses_dlq() {
        let dlq = Dlq::new();
        dlq.push("n1", DataEnvelope::new(), &NodeError::Cancelled).await;
        assert_eq!(dlq.length().await, 0);
    }

    #[tokio::test]
    async fn pop_at_removes_and_shifts() {
        let dlq = Dlq::new();
        dlq.push("n1", DataEnvelope::new(), &NodeError::execution("A", "a")).await;
        dlq.push("n2", DataEnvelope::new(), &NodeError::execution("B", "b")).await;
        let popped = dlq.pop_at(0).await.unwrap();
        assert_eq!(popped.node_id, "n1");
        assert_eq!(dlq.length().await, 1);
        assert_eq!(dlq.peek(1).await[0].node_id, "n2");
    }
}
