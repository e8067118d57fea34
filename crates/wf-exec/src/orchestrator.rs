use crate::{FlowRunner, OrchestratorError, PoolExecutor, RunnerState, RuntimeGraph};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use wf_core::{AnyNode, ProducerOutput};
use wf_domain::DataEnvelope;
use wf_graph::{default_post_processors, run_post_processors};
use wf_registry::NodeRegistry;
use wf_store::{DataStore, DevCache, Dlq};

struct RunningLoop {
    runner: Arc<FlowRunner>,
    state: watch::Receiver<RunnerState>,
    handle: JoinHandle<()>,
}

/// Owns a loaded workflow and runs it in either mode (C12).
///
/// Production mode spawns one [`FlowRunner`] per producer and lets them run
/// until `stop_all`. Development mode executes a single node at a time
/// against cached upstream output, for stepping through a workflow while
/// building it.
pub struct Orchestrator {
    registry: Arc<NodeRegistry>,
    pool_executor: Arc<PoolExecutor>,
    dlq: Arc<Dlq>,
    dev_cache: Arc<DevCache>,
    graph: RwLock<Option<Arc<RuntimeGraph>>>,
    runners: RwLock<HashMap<String, RunningLoop>>,
}

impl Orchestrator {
    pub fn new(registry: Arc<NodeRegistry>, datastore: Arc<dyn DataStore>, thread_workers: usize, process_workers: usize) -> Self {
        Self {
            registry,
            pool_executor: Arc::new(PoolExecutor::new(thread_workers, process_workers)),
            dlq: Arc::new(Dlq::new()),
            dev_cache: Arc::new(DevCache::new(datastore)),
            graph: RwLock::new(None),
            runners: RwLock::new(HashMap::new()),
        }
    }

    pub fn dlq(&self) -> &Arc<Dlq> {
        &self.dlq
    }

    pub async fn load_workflow(&self, json: &str) -> Result<(), OrchestratorError> {
        let mut graph = wf_graph::load_workflow(json, &self.registry)?;
        run_post_processors(&mut graph, &default_post_processors()).await?;
        *self.graph.write().await = Some(Arc::new(RuntimeGraph::from_workflow(graph)));
        Ok(())
    }

    async fn graph(&self) -> Result<Arc<RuntimeGraph>, OrchestratorError> {
        self.graph.read().await.clone().ok_or_else(|| OrchestratorError::UnknownNode("no workflow loaded".to_string()))
    }

    /// Creates one `FlowRunner` per producer and starts them concurrently.
    pub async fn start_all(&self) -> Result<(), OrchestratorError> {
        let graph = self.graph().await?;
        let mut runners = self.runners.write().await;
        for producer_id in graph.producer_ids() {
            if runners.contains_key(&producer_id) {
                continue;
            }
            let (runner, state) = FlowRunner::new(producer_id.clone(), graph.clone(), self.pool_executor.clone(), self.dlq.clone());
            let runner = Arc::new(runner);
            let spawned = runner.clone();
            let handle = tokio::spawn(async move { spawned.run().await });
            runners.insert(producer_id, RunningLoop { runner, state, handle });
        }
        Ok(())
    }

    /// Signals every runner to stop and awaits them all.
    pub async fn stop_all(&self) -> Result<(), OrchestratorError> {
        let mut runners = self.runners.write().await;
        for running in runners.values() {
            running.runner.stop();
        }
        for (_, running) in runners.drain() {
            let _ = running.handle.await;
        }
        Ok(())
    }

    pub async fn running_loops(&self) -> Vec<String> {
        let runners = self.runners.read().await;
        runners.values().filter(|r| *r.state.borrow() != RunnerState::Stopped).map(|r| r.runner.producer_id().to_string()).collect()
    }

    /// Runs one node against resolved input, writing the result into
    /// DevCache under `id` (development mode, 4.10).
    pub async fn execute_node(&self, id: &str, input: Option<DataEnvelope>) -> Result<DataEnvelope, OrchestratorError> {
        let graph = self.graph().await?;
        let node = graph.node_by_id(id).ok_or_else(|| OrchestratorError::UnknownNode(id.to_string()))?;

        let env = match input {
            Some(env) => env,
            None => self.resolve_from_cache(&graph, id).await?,
        };

        let pool = node.preferred_pool();
        let result = self
            .pool_executor
            .dispatch(pool, env, |env| async move {
                let mut guard = node.lock().await;
                match &mut *guard {
                    AnyNode::Blocking(b) => b.execute(env).await,
                    AnyNode::NonBlocking(n) => n.execute(env).await,
                    AnyNode::Logical(l) => l.execute(env).await,
                    AnyNode::Producer(p) => match p.execute(env).await? {
                        ProducerOutput::Envelope(env) => Ok(env),
                        ProducerOutput::Complete => Err(wf_core::NodeError::NotReady("producer signalled completion with no output to cache".to_string())),
                    },
                }
            })
            .await?;

        self.dev_cache.set(id, result.clone(), None).await?;
        Ok(result)
    }

    /// Merges cached output of every upstream node. Fails with
    /// `UnresolvedDependency` on the first upstream node with no cached
    /// output, rather than guessing a default.
    async fn resolve_from_cache(&self, graph: &RuntimeGraph, id: &str) -> Result<DataEnvelope, OrchestratorError> {
        let upstream = graph.upstream_of(id);
        if upstream.is_empty() {
            return Ok(DataEnvelope::new());
        }
        let mut merged = DataEnvelope::new();
        for up in upstream {
            let cached = self.dev_cache.get(&up.id).await?.ok_or_else(|| OrchestratorError::UnresolvedDependency(up.id.clone()))?;
            for (k, v) in cached.data() {
                merged.set(k.clone(), v.clone());
            }
            for (k, v) in cached.metadata() {
                merged.set_meta(k.clone(), v.clone());
            }
        }
        Ok(merged)
    }

    pub async fn clear_cache(&self) -> Result<(), OrchestratorError> {
        self.dev_cache.clear_all().await?;
        Ok(())
    }

    pub async fn shutdown(&self) -> Result<(), OrchestratorError> {
        self.stop_all().await
    }
}
