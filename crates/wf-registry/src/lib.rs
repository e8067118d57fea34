//! wf-registry: compile-time discovery of concrete node kinds (C5).
//!
//! Rust has no runtime package reflection, so "discover all concrete node
//! kinds reachable in the binary" is implemented at link time: each node
//! module calls [`register_node!`] once, submitting a [`NodeFactory`] into
//! an `inventory` collection. [`NodeRegistry::discover`] walks that
//! collection at startup and builds the `type_identifier -> factory` map.

mod errors;
mod factory;
mod registry;

pub use errors::RegistryError;
pub use factory::NodeFactory;
pub use registry::NodeRegistry;

// Re-exported so `register_node!` can expand to `$crate::inventory::submit!`
// without requiring every node crate to depend on `inventory` directly.
pub use inventory;
