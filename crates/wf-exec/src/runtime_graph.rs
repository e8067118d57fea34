use indexmap::IndexMap;
use std::collections::HashMap;
use tokio::sync::Mutex;
use wf_core::{AnyNode, NodeKind, QueueRole};
use wf_domain::{BranchKey, NodeConfig, Pool};
use wf_graph::WorkflowGraph;

/// One vertex, converted from a `wf_graph::WorkflowNode`. The behavior
/// object gets its own lock instead of sharing one lock over the whole
/// graph, so FlowRunners on independent loops never block on each other
/// (Section 5: "across FlowRunners, no ordering is guaranteed").
pub struct RuntimeNode {
    pub id: String,
    pub config: NodeConfig,
    pub next: IndexMap<BranchKey, Vec<usize>>,
    kind: NodeKind,
    queue_role: Option<QueueRole>,
    node: Mutex<AnyNode>,
}

impl RuntimeNode {
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn preferred_pool(&self) -> Pool {
        self.config.preferred_pool()
    }

    pub fn queue_role(&self) -> Option<QueueRole> {
        self.queue_role
    }

    pub async fn lock(&self) -> tokio::sync::MutexGuard<'_, AnyNode> {
        self.node.lock().await
    }
}

/// Runtime-only view of a built, post-processed `WorkflowGraph`: same
/// topology, but indices are plain `usize` and every node's behavior lives
/// behind its own `tokio::sync::Mutex` so it can be awaited while held.
pub struct RuntimeGraph {
    nodes: Vec<RuntimeNode>,
    index_of: HashMap<String, usize>,
}

impl RuntimeGraph {
    pub fn from_workflow(graph: WorkflowGraph) -> Self {
        let arena = graph.into_nodes();
        let mut index_of = HashMap::with_capacity(arena.len());
        let nodes = arena
            .into_iter()
            .enumerate()
            .map(|(i, wn)| {
                index_of.insert(wn.id.clone(), i);
                let next = wn.next.into_iter().map(|(key, list)| (key, list.into_iter().map(|idx| idx.index()).collect())).collect();
                RuntimeNode { id: wn.id, kind: wn.node.kind(), queue_role: wn.node.queue_role(), config: wn.config, next, node: Mutex::new(wn.node) }
            })
            .collect();
        Self { nodes, index_of }
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_of.get(id).copied()
    }

    pub fn node(&self, index: usize) -> &RuntimeNode {
        &self.nodes[index]
    }

    pub fn node_by_id(&self, id: &str) -> Option<&RuntimeNode> {
        self.index_of(id).map(|i| self.node(i))
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &RuntimeNode)> {
        self.nodes.iter().enumerate()
    }

    pub fn producer_ids(&self) -> Vec<String> {
        self.nodes.iter().filter(|n| n.kind == NodeKind::Producer).map(|n| n.id.clone()).collect()
    }

    /// Every node with at least one edge into `id`, used by development-mode
    /// dependency resolution.
    pub fn upstream_of(&self, id: &str) -> Vec<&RuntimeNode> {
        let Some(target) = self.index_of(id) else {
            return Vec::new();
        };
        self.nodes.iter().filter(|n| n.next.values().any(|list| list.contains(&target))).collect()
    }

    /// Picks the outgoing edge from `current`, honoring a Logical node's
    /// `branch_label` when supplied, else the default key, else the first
    /// declared branch list. Takes the first neighbor in that list (4.9
    /// step 3: fan-out beyond the first is a legitimate extension, not
    /// required for correctness).
    pub fn pick_next(&self, current: usize, branch_label: Option<&BranchKey>) -> Option<usize> {
        let node = self.node(current);
        let list = branch_label
            .and_then(|label| node.next.get(label))
            .or_else(|| node.next.get(&BranchKey::default_key()))
            .or_else(|| node.next.values().next())?;
        list.first().copied()
    }
}
