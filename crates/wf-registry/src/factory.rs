use wf_core::AnyNode;
use wf_domain::NodeConfig;

/// One entry in the compile-time registry: a node's identifier paired with
/// the function that builds it from a `NodeConfig`. `register_node!`
/// submits one of these into `inventory`'s collection at link time — there
/// is no runtime package scan, per the Design Notes' replacement for
/// reflective discovery.
pub struct NodeFactory {
    pub identifier: &'static str,
    pub construct: fn(&NodeConfig) -> AnyNode,
}

inventory::collect!(NodeFactory);

/// Registers a concrete node kind at startup. Use from a concrete node's
/// module:
///
/// ```ignore
/// wf_registry::register_node!(NodeFactory {
///     identifier: "http-poller-producer",
///     construct: |cfg| AnyNode::Producer(Box::new(HttpPoller::from_config(cfg))),
/// });
/// ```
#[macro_export]
macro_rules! register_node {
    ($factory:expr) => {
        $crate::inventory::submit! { $factory }
    };
}
