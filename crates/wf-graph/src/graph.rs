use crate::GraphError;
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use wf_core::{AnyNode, NodeKind};
use wf_domain::{BranchKey, NodeConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeIndex(usize);

impl NodeIndex {
    /// Raw arena position. Used by wf-exec to rebuild adjacency over its own
    /// runtime representation after `into_nodes` hands back the arena.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// One vertex: its id, its static config, its behavior, and its outgoing
/// edges grouped by branch key. Per the Design Notes, adjacency stores
/// indices into the graph's arena, not ids or references, so traversal
/// never needs to re-resolve a string lookup.
pub struct WorkflowNode {
    pub id: String,
    pub config: NodeConfig,
    pub node: AnyNode,
    pub next: IndexMap<BranchKey, Vec<NodeIndex>>,
}

/// Arena-plus-index representation of the whole DAG. Cycles are tolerated
/// at this level (orphans too); only the runtime (FlowRunner, find_loops)
/// guards against infinite traversal.
#[derive(Default)]
pub struct WorkflowGraph {
    arena: Vec<WorkflowNode>,
    index_of: HashMap<String, NodeIndex>,
}

impl WorkflowGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, config: NodeConfig, node: AnyNode) -> Result<NodeIndex, GraphError> {
        let id = config.id().to_string();
        if self.index_of.contains_key(&id) {
            return Err(GraphError::DuplicateNode(id));
        }
        let idx = NodeIndex(self.arena.len());
        self.arena.push(WorkflowNode { id: id.clone(), config, node, next: IndexMap::new() });
        self.index_of.insert(id, idx);
        Ok(idx)
    }

    pub fn index_of(&self, id: &str) -> Option<NodeIndex> {
        self.index_of.get(id).copied()
    }

    pub fn node(&self, idx: NodeIndex) -> &WorkflowNode {
        &self.arena[idx.0]
    }

    pub fn node_mut(&mut self, idx: NodeIndex) -> &mut WorkflowNode {
        &mut self.arena[idx.0]
    }

    pub fn node_by_id(&self, id: &str) -> Option<&WorkflowNode> {
        self.index_of(id).map(|i| self.node(i))
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeIndex, &WorkflowNode)> {
        self.arena.iter().enumerate().map(|(i, n)| (NodeIndex(i), n))
    }

    /// Consumes the graph, handing back its arena in position order (vertex
    /// `i` is `NodeIndex(i)`). Used by wf-exec to rebuild a runtime
    /// representation that wraps each node's behavior in its own lock
    /// instead of one lock over the whole graph.
    pub fn into_nodes(self) -> Vec<WorkflowNode> {
        self.arena
    }

    /// Appends `to` onto `from.next[key]`; never overwrites, so repeated
    /// connects with the same `(from, to, key)` accumulate rather than
    /// collapse (invariant 2 in the testable properties).
    pub fn connect(&mut self, from: &str, to: &str, key: BranchKey) -> Result<(), GraphError> {
        let from_idx = self.index_of(from).ok_or_else(|| GraphError::UnknownNode(from.to_string()))?;
        let to_idx = self.index_of(to).ok_or_else(|| GraphError::UnknownNode(to.to_string()))?;
        self.arena[from_idx.0].next.entry(key).or_default().push(to_idx);
        Ok(())
    }

    pub fn neighbors(&self, id: &str) -> Option<&IndexMap<BranchKey, Vec<NodeIndex>>> {
        self.node_by_id(id).map(|n| &n.next)
    }

    /// O(V*E): returns every node with at least one edge into `id`.
    pub fn upstream(&self, id: &str) -> Vec<&WorkflowNode> {
        let Some(target) = self.index_of(id) else {
            return Vec::new();
        };
        self.arena.iter().filter(|n| n.next.values().any(|list| list.contains(&target))).collect()
    }

    /// Deterministic pick: first node with no incoming edges; else first
    /// producer; else first declared.
    pub fn first_node(&self) -> Option<&WorkflowNode> {
        let mut has_incoming: HashSet<NodeIndex> = HashSet::new();
        for node in &self.arena {
            for list in node.next.values() {
                has_incoming.extend(list.iter().copied());
            }
        }
        self.arena
            .iter()
            .enumerate()
            .find(|(i, _)| !has_incoming.contains(&NodeIndex(*i)))
            .map(|(_, n)| n)
            .or_else(|| self.arena.iter().find(|n| n.node.kind() == NodeKind::Producer))
            .or_else(|| self.arena.first())
    }

    /// For each producer, walks forward (default branch, else first
    /// available list, first neighbor of that list) until hitting a
    /// NonBlocking node. Cuts off and warns on a revisit instead of
    /// looping forever.
    pub fn find_loops(&self) -> Vec<(NodeIndex, NodeIndex)> {
        let mut loops = Vec::new();
        for (idx, node) in self.iter() {
            if node.node.kind() != NodeKind::Producer {
                continue;
            }
            let mut visited = HashSet::new();
            let mut current = idx;
            visited.insert(current);
            loop {
                let Some(next) = self.pick_default_branch(current) else {
                    break;
                };
                if !visited.insert(next) {
                    tracing::warn!(producer = %node.id, "find_loops: cycle detected, cutting traversal");
                    break;
                }
                if self.node(next).node.is_non_blocking() {
                    loops.push((idx, next));
                    break;
                }
                current = next;
            }
        }
        loops
    }

    fn pick_default_branch(&self, idx: NodeIndex) -> Option<NodeIndex> {
        let node = self.node(idx);
        let chosen = node.next.get(&BranchKey::default_key()).or_else(|| node.next.values().next())?;
        chosen.first().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use indexmap::IndexMap as Map;
    use wf_core::{NodeBase, NonBlockingNode, ProducerNode, ProducerOutput};
    use wf_domain::{DataEnvelope, Pool};

    struct Stub(&'static str, NodeKind);
    #[async_trait]
    impl NodeBase for Stub {
        fn identifier(&self) -> &'static str {
            self.0
        }
        fn preferred_pool(&self) -> Pool {
            Pool::Cooperative
        }
    }
    #[async_trait]
    impl ProducerNode for Stub {
        async fn execute(&mut self, env: DataEnvelope) -> Result<ProducerOutput, wf_core::NodeError> {
            Ok(ProducerOutput::Envelope(env))
        }
    }
    #[async_trait]
    impl NonBlockingNode for Stub {
        async fn execute(&mut self, env: DataEnvelope) -> Result<DataEnvelope, wf_core::NodeError> {
            Ok(env)
        }
    }

    fn cfg(id: &str, ty: &str) -> NodeConfig {
        NodeConfig::new(id, ty, Pool::Cooperative, Map::new(), Map::new()).unwrap()
    }

    #[test]
    fn connect_appends_and_never_overwrites() {
        let mut graph = WorkflowGraph::new();
        graph.add_node(cfg("a", "producer"), AnyNode::Producer(Box::new(Stub("producer", NodeKind::Producer)))).unwrap();
        graph.add_node(cfg("b", "terminator"), AnyNode::NonBlocking(Box::new(Stub("terminator", NodeKind::NonBlocking)))).unwrap();
        graph.add_node(cfg("c", "terminator"), AnyNode::NonBlocking(Box::new(Stub("terminator", NodeKind::NonBlocking)))).unwrap();

        let key = BranchKey::default_key();
        graph.connect("a", "b", key.clone()).unwrap();
        graph.connect("a", "c", key.clone()).unwrap();

        let neighbors = graph.neighbors("a").unwrap();
        assert_eq!(neighbors.get(&key).unwrap().len(), 2);
    }

    #[test]
    fn duplicate_id_rejected() {
        let mut graph = WorkflowGraph::new();
        graph.add_node(cfg("a", "producer"), AnyNode::Producer(Box::new(Stub("producer", NodeKind::Producer)))).unwrap();
        let err = graph.add_node(cfg("a", "producer"), AnyNode::Producer(Box::new(Stub("producer", NodeKind::Producer)))).unwrap_err();
        assert!(matches!(err, GraphError::DuplicateNode(_)));
    }

    #[test]
    fn find_loops_pairs_producer_with_terminator() {
        let mut graph = WorkflowGraph::new();
        graph.add_node(cfg("p", "producer"), AnyNode::Producer(Box::new(Stub("producer", NodeKind::Producer)))).unwrap();
        graph.add_node(cfg("q", "terminator"), AnyNode::NonBlocking(Box::new(Stub("terminator", NodeKind::NonBlocking)))).unwrap();
        graph.connect("p", "q", BranchKey::default_key()).unwrap();

        let loops = graph.find_loops();
        assert_eq!(loops.len(), 1);
        let (producer_idx, terminator_idx) = loops[0];
        assert_eq!(graph.node(producer_idx).id, "p");
        assert_eq!(graph.node(terminator_idx).id, "q");
    }
}
