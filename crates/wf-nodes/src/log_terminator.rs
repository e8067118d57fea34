use async_trait::async_trait;
use wf_core::{NodeBase, NodeError, NonBlockingNode};
use wf_domain::{DataEnvelope, NodeConfig, Pool};
use wf_registry::{register_node, NodeFactory};

/// Terminates an iteration by logging the envelope at `info` and passing it
/// through unchanged. The simplest possible `NonBlocking` node; useful as a
/// loop's last hop when nothing downstream of the chain needs the result.
pub struct LogTerminator {
    label: String,
}

impl LogTerminator {
    fn from_config(config: &NodeConfig) -> Self {
        let label = config.config().get("label").and_then(|v| v.as_str()).unwrap_or(config.id()).to_string();
        Self { label }
    }
}

#[async_trait]
impl NodeBase for LogTerminator {
    fn identifier(&self) -> &'static str {
        "log-terminator"
    }

    fn preferred_pool(&self) -> Pool {
        Pool::Cooperative
    }
}

#[async_trait]
impl NonBlockingNode for LogTerminator {
    async fn execute(&mut self, env: DataEnvelope) -> Result<DataEnvelope, NodeError> {
        tracing::info!(label = %self.label, data = ?env.data(), "log-terminator");
        Ok(env)
    }
}

register_node!(NodeFactory { identifier: "log-terminator", construct: |cfg| wf_core::AnyNode::NonBlocking(Box::new(LogTerminator::from_config(cfg))) });
