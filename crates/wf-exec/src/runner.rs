use crate::{PoolExecutor, RuntimeGraph};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use wf_core::{AnyNode, NodeKind, ProducerOutput};
use wf_domain::{BranchKey, DataEnvelope};
use wf_store::Dlq;

/// Fixed delay after routing a chain failure to the DLQ. Not a retry delay
/// (the kernel never retries a failed node on its own) — only enough to
/// keep a persistently-failing producer from spinning a hot loop.
const FAILURE_BACKOFF: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    Idle,
    Running,
    Paused,
    Stopping,
    Stopped,
}

/// One per producer (C11). Drives iterations of producer -> chain ->
/// NonBlocking terminator until stopped or the producer signals
/// `ExecutionComplete`.
pub struct FlowRunner {
    producer_id: String,
    graph: Arc<RuntimeGraph>,
    pool_executor: Arc<PoolExecutor>,
    dlq: Arc<Dlq>,
    state_tx: watch::Sender<RunnerState>,
}

enum IterationOutcome {
    Continue,
    Complete,
    Failed,
}

impl FlowRunner {
    pub fn new(producer_id: impl Into<String>, graph: Arc<RuntimeGraph>, pool_executor: Arc<PoolExecutor>, dlq: Arc<Dlq>) -> (Self, watch::Receiver<RunnerState>) {
        let (state_tx, state_rx) = watch::channel(RunnerState::Idle);
        (Self { producer_id: producer_id.into(), graph, pool_executor, dlq, state_tx }, state_rx)
    }

    pub fn producer_id(&self) -> &str {
        &self.producer_id
    }

    pub fn state(&self) -> RunnerState {
        *self.state_tx.borrow()
    }

    /// Flips `Running -> Stopping`; the runner exits at the next iteration
    /// boundary (Section 5's "flag observed at iteration boundaries").
    pub fn stop(&self) {
        self.state_tx.send_if_modified(|s| {
            if *s == RunnerState::Running {
                *s = RunnerState::Stopping;
                true
            } else {
                false
            }
        });
    }

    fn set_state(&self, state: RunnerState) {
        let _ = self.state_tx.send(state);
    }

    pub async fn run(&self) {
        self.set_state(RunnerState::Running);
        loop {
            if self.state() == RunnerState::Stopping {
                break;
            }
            match self.run_iteration().await {
                IterationOutcome::Continue => continue,
                IterationOutcome::Complete => break,
                IterationOutcome::Failed => {
                    self.set_state(RunnerState::Paused);
                    tokio::time::sleep(FAILURE_BACKOFF).await;
                    if self.state() == RunnerState::Stopping {
                        break;
                    }
                    self.set_state(RunnerState::Running);
                }
            }
        }
        self.set_state(RunnerState::Stopped);
    }

    async fn run_iteration(&self) -> IterationOutcome {
        let Some(producer_idx) = self.graph.index_of(&self.producer_id) else {
            tracing::error!(producer = %self.producer_id, "flow runner: producer id vanished from graph");
            return IterationOutcome::Failed;
        };
        let producer = self.graph.node(producer_idx);
        let pool = producer.preferred_pool();

        let seed = DataEnvelope::new();
        let in_flight = seed.clone();
        let dispatched = self
            .pool_executor
            .dispatch(pool, seed, |env| async move {
                let mut guard = producer.lock().await;
                match &mut *guard {
                    AnyNode::Producer(p) => p.execute(env).await,
                    _ => unreachable!("producer slot always holds a Producer"),
                }
            })
            .await;

        let mut env = match dispatched {
            Err(err) => {
                self.dlq.push(&self.producer_id, in_flight, &err).await;
                return if err.is_cancelled() { IterationOutcome::Complete } else { IterationOutcome::Failed };
            }
            Ok(ProducerOutput::Complete) => return IterationOutcome::Complete,
            Ok(ProducerOutput::Envelope(env)) => env,
        };

        let mut visited = std::collections::HashSet::new();
        visited.insert(producer_idx);
        let mut current_idx = producer_idx;
        let mut current_branch_label: Option<BranchKey> = None;

        loop {
            let Some(next_idx) = self.graph.pick_next(current_idx, current_branch_label.as_ref()) else {
                tracing::debug!(producer = %self.producer_id, node = %self.graph.node(current_idx).id, "flow runner: no outgoing edge, ending iteration");
                return IterationOutcome::Continue;
            };
            if !visited.insert(next_idx) {
                tracing::warn!(producer = %self.producer_id, "flow runner: revisited node mid-iteration, cutting traversal");
                return IterationOutcome::Continue;
            }

            let next = self.graph.node(next_idx);
            let pool = next.preferred_pool();
            let in_flight = env.clone();
            let dispatched = self
                .pool_executor
                .dispatch(pool, env, |env| async move {
                    let mut guard = next.lock().await;
                    match &mut *guard {
                        AnyNode::Blocking(b) => b.execute(env).await,
                        AnyNode::NonBlocking(n) => n.execute(env).await,
                        AnyNode::Logical(l) => l.execute(env).await,
                        AnyNode::Producer(_) => Err(wf_core::NodeError::execution("TypeError", "producer cannot appear mid-chain")),
                    }
                })
                .await;

            env = match dispatched {
                Err(err) => {
                    self.dlq.push(&next.id, in_flight, &err).await;
                    return if err.is_cancelled() { IterationOutcome::Complete } else { IterationOutcome::Failed };
                }
                Ok(env) => env,
            };

            let branch_label = if next.kind() == NodeKind::Logical {
                let guard = next.lock().await;
                match &*guard {
                    AnyNode::Logical(l) => l.branch_label(),
                    _ => None,
                }
            } else {
                None
            };

            if next.kind() == NodeKind::NonBlocking {
                return IterationOutcome::Continue;
            }

            current_idx = next_idx;
            current_branch_label = branch_label;
        }
    }
}
