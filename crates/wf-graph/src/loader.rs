use crate::{GraphError, LoaderError, WorkflowGraph};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use wf_domain::{BranchKey, NodeConfig, Pool};
use wf_registry::NodeRegistry;

#[derive(Debug, Deserialize)]
struct RawDocument {
    nodes: Vec<RawNode>,
    edges: Vec<RawEdge>,
}

#[derive(Debug, Deserialize)]
struct RawNode {
    id: String,
    #[serde(rename = "type")]
    type_identifier: String,
    #[serde(default)]
    data: RawNodeData,
}

#[derive(Debug, Default, Deserialize)]
struct RawNodeData {
    #[serde(default)]
    form: IndexMap<String, Value>,
    #[serde(default)]
    config: IndexMap<String, Value>,
}

#[derive(Debug, Deserialize)]
struct RawEdge {
    source: String,
    target: String,
    #[serde(default, rename = "sourceHandle")]
    source_handle: Option<String>,
}

fn preferred_pool_of(config: &IndexMap<String, Value>) -> Pool {
    match config.get("preferred_pool").and_then(Value::as_str) {
        Some("THREAD") => Pool::Thread,
        Some("PROCESS") => Pool::Process,
        _ => Pool::Cooperative,
    }
}

/// Parses the Section 6 workflow JSON document, instantiates nodes via the
/// registry, and builds a [`WorkflowGraph`]. Unknown node types are logged
/// and skipped rather than aborting the whole load (`UnknownIdentifier`);
/// edges naming a skipped node are likewise skipped with a warning.
pub fn load_workflow(json: &str, registry: &NodeRegistry) -> Result<WorkflowGraph, LoaderError> {
    let doc: RawDocument = serde_json::from_str(json)?;
    let mut graph = WorkflowGraph::new();

    for raw in &doc.nodes {
        let config = NodeConfig::new(&raw.id, &raw.type_identifier, preferred_pool_of(&raw.data.config), raw.data.config.clone(), raw.data.form.clone())?;
        match registry.create(&config) {
            Some(node) => {
                graph.add_node(config, node)?;
            }
            None => {
                tracing::warn!(node_id = %raw.id, type_identifier = %raw.type_identifier, "unknown node identifier, skipping");
            }
        }
    }

    let mut connected = 0usize;
    for edge in &doc.edges {
        let key = BranchKey::normalize(edge.source_handle.as_deref());
        match graph.connect(&edge.source, &edge.target, key) {
            Ok(()) => connected += 1,
            Err(GraphError::UnknownNode(id)) => {
                tracing::warn!(missing_node = %id, source = %edge.source, target = %edge.target, "edge references a skipped or unknown node");
            }
            Err(other) => return Err(other.into()),
        }
    }

    tracing::info!(nodes = graph.len(), edges = connected, "workflow loaded");
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use wf_core::{AnyNode, NodeBase, NodeError, NonBlockingNode, ProducerNode, ProducerOutput};
    use wf_domain::DataEnvelope;
    use wf_registry::{register_node, NodeFactory};

    struct Producer;
    #[async_trait]
    impl NodeBase for Producer {
        fn identifier(&self) -> &'static str {
            "stub-producer"
        }
        fn preferred_pool(&self) -> Pool {
            Pool::Cooperative
        }
    }
    #[async_trait]
    impl ProducerNode for Producer {
        async fn execute(&mut self, env: DataEnvelope) -> Result<ProducerOutput, NodeError> {
            Ok(ProducerOutput::Envelope(env))
        }
    }

    struct Terminator;
    #[async_trait]
    impl NodeBase for Terminator {
        fn identifier(&self) -> &'static str {
            "stub-terminator"
        }
        fn preferred_pool(&self) -> Pool {
            Pool::Cooperative
        }
    }
    #[async_trait]
    impl NonBlockingNode for Terminator {
        async fn execute(&mut self, env: DataEnvelope) -> Result<DataEnvelope, NodeError> {
            Ok(env)
        }
    }

    register_node!(NodeFactory { identifier: "stub-producer", construct: |_cfg| AnyNode::Producer(Box::new(Producer)) });
    register_node!(NodeFactory { identifier: "stub-terminator", construct: |_cfg| AnyNode::NonBlocking(Box::new(Terminator)) });

    #[test]
    fn loads_nodes_and_normalizes_handles() {
        let registry = NodeRegistry::discover().unwrap();
        let json = r#"{
            "nodes": [
                { "id": "n1", "type": "stub-producer", "data": { "form": {}, "config": {} } },
                { "id": "n2", "type": "stub-terminator", "data": { "form": {}, "config": {} } }
            ],
            "edges": [
                { "source": "n1", "target": "n2", "sourceHandle": null }
            ]
        }"#;
        let graph = load_workflow(json, &registry).unwrap();
        assert_eq!(graph.len(), 2);
        let neighbors = graph.neighbors("n1").unwrap();
        assert!(neighbors.contains_key(&BranchKey::default_key()));
    }

    #[test]
    fn unknown_type_is_skipped_not_fatal() {
        let registry = NodeRegistry::discover().unwrap();
        let json = r#"{
            "nodes": [ { "id": "n1", "type": "does-not-exist", "data": { "form": {}, "config": {} } } ],
            "edges": []
        }"#;
        let graph = load_workflow(json, &registry).unwrap();
        assert_eq!(graph.len(), 0);
    }
}
