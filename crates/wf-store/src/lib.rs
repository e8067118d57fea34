//! wf-store: the process-safe external interface (C9) queue nodes use to
//! link loops, plus the two keyed stores built on top of its cache
//! primitive — DevCache and the DLQ (C13).

mod dev_cache;
mod dlq;
mod errors;
mod in_memory;
mod store;

pub use dev_cache::DevCache;
pub use dlq::Dlq;
pub use errors::StoreError;
pub use in_memory::InMemoryDataStore;
pub use store::{cache_key, queue_key, DataStore};
