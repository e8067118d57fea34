//! wf-domain: neutral data types shared across the workflow engine.
//!
//! Nothing in this crate talks to an executor, a pool, or a form dependency
//! graph — it only defines the shapes that flow between those subsystems:
//! the envelope, per-node configuration, execution pools, branch keys, form
//! field declarations, and dead-letter records.

mod branch;
mod dlq_record;
mod envelope;
mod field;
mod node_config;
mod pool;

pub use branch::BranchKey;
pub use dlq_record::DlqRecord;
pub use envelope::DataEnvelope;
pub use field::{is_blank, values_equivalent, FieldKind, FieldOption, FieldSpec};
pub use node_config::{NodeConfig, NodeConfigError};
pub use pool::Pool;
