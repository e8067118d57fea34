use async_trait::async_trait;
use wf_core::{BlockingNode, NodeBase, NodeError};
use wf_domain::{DataEnvelope, NodeConfig, Pool};
use wf_registry::{register_node, NodeFactory};

/// Uppercases the string at `field` (default `"text"`). Missing or
/// non-string input is passed through unchanged rather than failing, since
/// an empty envelope field is a normal starting state, not an error.
pub struct UppercaseTransform {
    field: String,
}

impl UppercaseTransform {
    fn from_config(config: &NodeConfig) -> Self {
        let field = config.config().get("field").and_then(|v| v.as_str()).unwrap_or("text").to_string();
        Self { field }
    }
}

#[async_trait]
impl NodeBase for UppercaseTransform {
    fn identifier(&self) -> &'static str {
        "uppercase-transform"
    }

    fn preferred_pool(&self) -> Pool {
        Pool::Cooperative
    }
}

#[async_trait]
impl BlockingNode for UppercaseTransform {
    async fn execute(&mut self, mut env: DataEnvelope) -> Result<DataEnvelope, NodeError> {
        if let Some(value) = env.get(&self.field).and_then(|v| v.as_str()).map(str::to_uppercase) {
            env.set(self.field.clone(), value);
        }
        Ok(env)
    }
}

register_node!(NodeFactory { identifier: "uppercase-transform", construct: |cfg| wf_core::AnyNode::Blocking(Box::new(UppercaseTransform::from_config(cfg))) });
