use once_cell::sync::OnceCell;
use std::sync::Arc;
use wf_store::DataStore;

/// Queue-linked nodes (`QueueWriterNode`/`QueueReaderNode`) are built by a
/// plain `fn(&NodeConfig) -> AnyNode` factory pointer — `inventory`'s
/// collection holds function pointers, not closures, so there's no place to
/// capture a runtime-built `Arc<dyn DataStore>` per factory. The CLI sets
/// this once, before loading any workflow, and queue node constructors read
/// it back. Reading before `set` is a programmer error, not a recoverable
/// one: a workflow with queue nodes cannot run without a store.
static SHARED_STORE: OnceCell<Arc<dyn DataStore>> = OnceCell::new();

pub fn set_shared_store(store: Arc<dyn DataStore>) {
    let _ = SHARED_STORE.set(store);
}

pub fn shared_store() -> Arc<dyn DataStore> {
    SHARED_STORE.get().expect("shared DataStore not set; call wf_nodes::set_shared_store before loading a workflow").clone()
}
