use async_trait::async_trait;
use wf_core::{NodeBase, NodeError, ProducerNode, ProducerOutput};
use wf_domain::{DataEnvelope, NodeConfig, Pool};
use wf_registry::{register_node, NodeFactory};

/// Produces an incrementing counter on every iteration, signalling
/// `ExecutionComplete` once `max_ticks` is reached. `max_ticks: 0` (the
/// default) means "never stop".
pub struct CounterProducer {
    tick: u64,
    max_ticks: u64,
}

impl CounterProducer {
    fn from_config(config: &NodeConfig) -> Self {
        let max_ticks = config.config().get("max_ticks").and_then(|v| v.as_u64()).unwrap_or(0);
        Self { tick: 0, max_ticks }
    }
}

#[async_trait]
impl NodeBase for CounterProducer {
    fn identifier(&self) -> &'static str {
        "counter-producer"
    }

    fn preferred_pool(&self) -> Pool {
        Pool::Cooperative
    }
}

#[async_trait]
impl ProducerNode for CounterProducer {
    async fn execute(&mut self, mut env: DataEnvelope) -> Result<ProducerOutput, NodeError> {
        if self.max_ticks > 0 && self.tick >= self.max_ticks {
            return Ok(ProducerOutput::Complete);
        }
        env.set("tick", self.tick);
        self.tick += 1;
        Ok(ProducerOutput::Envelope(env))
    }
}

register_node!(NodeFactory { identifier: "counter-producer", construct: |cfg| wf_core::AnyNode::Producer(Box::new(CounterProducer::from_config(cfg))) });
