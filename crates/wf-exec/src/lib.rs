//! wf-exec: the runtime layer — pool dispatch (C10), per-producer loop
//! drivers (C11), and the production/development orchestrator (C12) that
//! ties loaded workflows to running ones.

pub mod config;
mod errors;
mod orchestrator;
mod pool;
mod runner;
mod runtime_graph;

pub use config::{AppConfig, CONFIG};
pub use errors::OrchestratorError;
pub use orchestrator::Orchestrator;
pub use pool::PoolExecutor;
pub use runner::{FlowRunner, RunnerState};
pub use runtime_graph::{RuntimeGraph, RuntimeNode};
