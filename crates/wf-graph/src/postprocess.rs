use crate::{WorkflowError, WorkflowGraph};
use async_trait::async_trait;
use wf_core::QueueRole;
use wf_domain::BranchKey;

/// Ordered pass over a built graph that may mutate node configs before the
/// workflow is handed to the Orchestrator.
#[async_trait]
pub trait PostProcessor: Send + Sync {
    fn name(&self) -> &'static str;
    async fn run(&self, graph: &mut WorkflowGraph) -> Result<(), WorkflowError>;
}

/// Auto-assigns a queue name to every connected QueueWriter -> QueueReader
/// pair where neither side named one explicitly. The literal "both sides
/// default" rule is adopted straight from the source (Open Question,
/// SPEC_FULL 9): an explicit name on either side always wins, and a
/// one-sided override is left for ReadinessValidator to catch.
pub struct QueueLinker;

fn is_default_queue_name(value: Option<&serde_json::Value>) -> bool {
    match value.and_then(|v| v.as_str()) {
        None => true,
        Some(s) => s.is_empty() || s.eq_ignore_ascii_case(BranchKey::DEFAULT),
    }
}

#[async_trait]
impl PostProcessor for QueueLinker {
    fn name(&self) -> &'static str {
        "queue-linker"
    }

    async fn run(&self, graph: &mut WorkflowGraph) -> Result<(), WorkflowError> {
        let pairs: Vec<(crate::NodeIndex, crate::NodeIndex)> = graph
            .iter()
            .filter(|(_, n)| n.node.queue_role() == Some(QueueRole::Writer))
            .flat_map(|(writer_idx, writer)| writer.next.values().flatten().copied().map(move |reader_idx| (writer_idx, reader_idx)))
            .filter(|(_, reader_idx)| graph.node(*reader_idx).node.queue_role() == Some(QueueRole::Reader))
            .collect();

        for (writer_idx, reader_idx) in pairs {
            let writer_has_default = is_default_queue_name(graph.node(writer_idx).config.form_value("queue"));
            let reader_has_default = is_default_queue_name(graph.node(reader_idx).config.form_value("queue"));
            if !(writer_has_default && reader_has_default) {
                continue;
            }
            let writer_id = graph.node(writer_idx).id.clone();
            let reader_id = graph.node(reader_idx).id.clone();
            let derived = format!("q_{writer_id}_{reader_id}");

            let writer = graph.node_mut(writer_idx);
            writer.config = writer.config.with_form_value("queue", derived.clone());
            let reader = graph.node_mut(reader_idx);
            reader.config = reader.config.with_form_value("queue", derived.clone());

            tracing::info!(writer = %writer_id, reader = %reader_id, queue = %derived, "queue-linker: assigned derived queue name");
        }
        Ok(())
    }
}

/// Calls every node's readiness check (its kind-appropriate `init`) and
/// aggregates per-node failures into a single `WorkflowInvalid` report.
pub struct ReadinessValidator;

#[async_trait]
impl PostProcessor for ReadinessValidator {
    fn name(&self) -> &'static str {
        "readiness-validator"
    }

    async fn run(&self, graph: &mut WorkflowGraph) -> Result<(), WorkflowError> {
        let indices: Vec<crate::NodeIndex> = graph.iter().map(|(idx, _)| idx).collect();
        let mut failures = Vec::new();
        for idx in indices {
            let node = graph.node_mut(idx);
            if let Err(err) = node.node.init().await {
                failures.push(format!("  - {}: {}", node.id, err));
            }
        }
        if failures.is_empty() {
            Ok(())
        } else {
            Err(WorkflowError::Invalid(failures.join("\n")))
        }
    }
}

/// Runs an ordered list of post-processors, matching the teacher's
/// composite-strategy pattern (several small strategies folded by one
/// runner) applied to graph mutation instead of parameter injection.
pub async fn run_post_processors(graph: &mut WorkflowGraph, passes: &[Box<dyn PostProcessor>]) -> Result<(), WorkflowError> {
    for pass in passes {
        tracing::debug!(pass = pass.name(), "running post-processor");
        pass.run(graph).await?;
    }
    Ok(())
}

pub fn default_post_processors() -> Vec<Box<dyn PostProcessor>> {
    vec![Box::new(QueueLinker), Box::new(ReadinessValidator)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WorkflowGraph;
    use async_trait::async_trait as at;
    use indexmap::IndexMap;
    use wf_core::{AnyNode, NodeBase, NodeError, NonBlockingNode, ProducerNode, ProducerOutput};
    use wf_domain::{DataEnvelope, NodeConfig, Pool};

    struct QueueWriter;
    #[at]
    impl NodeBase for QueueWriter {
        fn identifier(&self) -> &'static str {
            "queue-writer"
        }
        fn preferred_pool(&self) -> Pool {
            Pool::Cooperative
        }
        fn queue_role(&self) -> Option<QueueRole> {
            Some(QueueRole::Writer)
        }
    }
    #[at]
    impl NonBlockingNode for QueueWriter {
        async fn execute(&mut self, env: DataEnvelope) -> Result<DataEnvelope, NodeError> {
            Ok(env)
        }
    }

    struct QueueReader;
    #[at]
    impl NodeBase for QueueReader {
        fn identifier(&self) -> &'static str {
            "queue-reader"
        }
        fn preferred_pool(&self) -> Pool {
            Pool::Cooperative
        }
        fn queue_role(&self) -> Option<QueueRole> {
            Some(QueueRole::Reader)
        }
    }
    #[at]
    impl ProducerNode for QueueReader {
        async fn execute(&mut self, env: DataEnvelope) -> Result<ProducerOutput, NodeError> {
            Ok(ProducerOutput::Envelope(env))
        }
    }

    fn cfg(id: &str, ty: &str) -> NodeConfig {
        NodeConfig::new(id, ty, Pool::Cooperative, IndexMap::new(), IndexMap::new()).unwrap()
    }

    #[tokio::test]
    async fn derives_queue_name_when_both_sides_default() {
        let mut graph = WorkflowGraph::new();
        graph.add_node(cfg("qw", "queue-writer"), AnyNode::NonBlocking(Box::new(QueueWriter))).unwrap();
        graph.add_node(cfg("qr", "queue-reader"), AnyNode::Producer(Box::new(QueueReader))).unwrap();
        graph.connect("qw", "qr", BranchKey::default_key()).unwrap();

        QueueLinker.run(&mut graph).await.unwrap();

        assert_eq!(graph.node_by_id("qw").unwrap().config.form_value("queue").unwrap(), "q_qw_qr");
        assert_eq!(graph.node_by_id("qr").unwrap().config.form_value("queue").unwrap(), "q_qw_qr");
    }

    #[tokio::test]
    async fn explicit_name_on_either_side_wins() {
        let mut graph = WorkflowGraph::new();
        let mut writer_form = IndexMap::new();
        writer_form.insert("queue".to_string(), serde_json::json!("explicit-name"));
        let writer_cfg = NodeConfig::new("qw", "queue-writer", Pool::Cooperative, IndexMap::new(), writer_form).unwrap();
        graph.add_node(writer_cfg, AnyNode::NonBlocking(Box::new(QueueWriter))).unwrap();
        graph.add_node(cfg("qr", "queue-reader"), AnyNode::Producer(Box::new(QueueReader))).unwrap();
        graph.connect("qw", "qr", BranchKey::default_key()).unwrap();

        QueueLinker.run(&mut graph).await.unwrap();

        assert_eq!(graph.node_by_id("qw").unwrap().config.form_value("queue").unwrap(), "explicit-name");
        assert!(graph.node_by_id("qr").unwrap().config.form_value("queue").is_none());
    }
}
