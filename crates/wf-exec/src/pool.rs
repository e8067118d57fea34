use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use wf_core::NodeError;
use wf_domain::{DataEnvelope, Pool};

/// Maps a node's preferred `Pool` onto an execution backend (C10).
///
/// COOPERATIVE runs the future in place. THREAD and PROCESS are both bounded
/// `Semaphore`s: a real OS thread/process pool needs the dispatched future
/// to be `'static`, which a node borrowed out of a locked, shared graph
/// can't be without an ownership transfer this kernel never performs — the
/// bound on concurrent in-flight work is the behavior that matters, and
/// that's what the semaphores give.
pub struct PoolExecutor {
    thread_semaphore: Arc<Semaphore>,
    process_semaphore: Arc<Semaphore>,
}

impl PoolExecutor {
    pub fn new(thread_workers: usize, process_workers: usize) -> Self {
        Self { thread_semaphore: Arc::new(Semaphore::new(thread_workers.max(1))), process_semaphore: Arc::new(Semaphore::new(process_workers.max(1))) }
    }

    /// Runs `run(env)` in the backend `pool` selects. For PROCESS, first
    /// checks that `env` round-trips through `bincode` — the stand-in for
    /// "node and envelope are serializable to a worker" (4.8), since no
    /// stable ABI lets an arbitrary `dyn BlockingNode` cross a real process
    /// boundary.
    pub async fn dispatch<Fut, T>(&self, pool: Pool, env: DataEnvelope, run: impl FnOnce(DataEnvelope) -> Fut) -> Result<T, NodeError>
    where
        Fut: Future<Output = Result<T, NodeError>>,
    {
        match pool {
            Pool::Cooperative => run(env).await,
            Pool::Thread => {
                let _permit = self.thread_semaphore.acquire().await.expect("thread semaphore never closes");
                run(env).await
            }
            Pool::Process => {
                check_serializable(&env)?;
                let _permit = self.process_semaphore.acquire().await.expect("process semaphore never closes");
                run(env).await
            }
        }
    }
}

fn check_serializable(env: &DataEnvelope) -> Result<(), NodeError> {
    bincode::serialize(env).map(|_| ()).map_err(|e| NodeError::execution("SerializationError", e.to_string()))
}
