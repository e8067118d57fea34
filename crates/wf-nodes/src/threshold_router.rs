use async_trait::async_trait;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use wf_core::{BlockingNode, LogicalNode, NodeBase, NodeError};
use wf_domain::{BranchKey, DataEnvelope, FieldKind, FieldSpec, NodeConfig, Pool};
use wf_forms::FormSpec;
use wf_registry::{register_node, NodeFactory};

static FORM_SPEC: Lazy<FormSpec> = Lazy::new(|| {
    let fields = vec![
        FieldSpec::new("mode", FieldKind::Select, "Comparison").required(true).with_default(serde_json::json!("gt")),
        FieldSpec::new("threshold", FieldKind::Number, "Threshold").required(true).with_default(serde_json::json!(0)),
    ];
    FormSpec::build(fields, IndexMap::new()).expect("threshold-router form spec is well-formed")
});

#[derive(Clone, Copy)]
enum Mode {
    GreaterThan,
    LessThan,
}

/// A `Logical` node: compares the numeric envelope field named by config
/// `"field"` (default `"value"`) against its form-configured threshold and
/// routes `"yes"`/`"no"` accordingly. Passes the envelope through
/// unchanged — routing is this node's only effect.
pub struct ThresholdRouter {
    field: String,
    mode: Mode,
    threshold: f64,
    last_label: Option<BranchKey>,
}

impl ThresholdRouter {
    fn from_config(config: &NodeConfig) -> Self {
        let field = config.config().get("field").and_then(|v| v.as_str()).unwrap_or("value").to_string();
        let mode = match config.form_value("mode").and_then(|v| v.as_str()) {
            Some("lt") => Mode::LessThan,
            _ => Mode::GreaterThan,
        };
        let threshold = config.form_value("threshold").and_then(|v| v.as_f64()).unwrap_or(0.0);
        Self { field, mode, threshold, last_label: None }
    }
}

#[async_trait]
impl NodeBase for ThresholdRouter {
    fn identifier(&self) -> &'static str {
        "threshold-router"
    }

    fn preferred_pool(&self) -> Pool {
        Pool::Cooperative
    }

    fn form_spec(&self) -> Option<&FormSpec> {
        Some(&FORM_SPEC)
    }
}

#[async_trait]
impl BlockingNode for ThresholdRouter {
    async fn execute(&mut self, env: DataEnvelope) -> Result<DataEnvelope, NodeError> {
        let value = env.get(&self.field).and_then(|v| v.as_f64()).ok_or_else(|| NodeError::execution("ValueError", format!("field '{}' is not a number", self.field)))?;
        let took_yes = match self.mode {
            Mode::GreaterThan => value > self.threshold,
            Mode::LessThan => value < self.threshold,
        };
        self.last_label = Some(BranchKey::from(if took_yes { "yes" } else { "no" }));
        Ok(env)
    }
}

impl LogicalNode for ThresholdRouter {
    fn branch_label(&self) -> Option<BranchKey> {
        self.last_label.clone()
    }
}

register_node!(NodeFactory { identifier: "threshold-router", construct: |cfg| wf_core::AnyNode::Logical(Box::new(ThresholdRouter::from_config(cfg))) });

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(mode: &str, threshold: f64) -> NodeConfig {
        let mut form = IndexMap::new();
        form.insert("mode".to_string(), serde_json::json!(mode));
        form.insert("threshold".to_string(), serde_json::json!(threshold));
        NodeConfig::new("r1", "threshold-router", Pool::Cooperative, IndexMap::new(), form).unwrap()
    }

    #[tokio::test]
    async fn routes_yes_when_greater_than_threshold() {
        let mut node = ThresholdRouter::from_config(&cfg("gt", 10.0));
        let mut env = DataEnvelope::new();
        env.set("value", 15);
        node.execute(env).await.unwrap();
        assert_eq!(node.branch_label().unwrap().as_str(), "yes");
    }

    #[tokio::test]
    async fn routes_no_when_not_past_threshold() {
        let mut node = ThresholdRouter::from_config(&cfg("gt", 10.0));
        let mut env = DataEnvelope::new();
        env.set("value", 5);
        node.execute(env).await.unwrap();
        assert_eq!(node.branch_label().unwrap().as_str(), "no");
    }

    #[tokio::test]
    async fn non_numeric_field_errors() {
        let mut node = ThresholdRouter::from_config(&cfg("gt", 10.0));
        let mut env = DataEnvelope::new();
        env.set("value", "not-a-number");
        let err = node.execute(env).await.unwrap_err();
        assert_eq!(err.error_kind(), "ValueError");
    }
}
