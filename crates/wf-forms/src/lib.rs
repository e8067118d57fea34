//! wf-forms: per-node configuration forms with cascading dependent fields.
//!
//! `FormSpec` is the validated, immutable shape of a form (fields plus the
//! dependency DAG derived from `depends_on`); `FormInstance` is the live
//! state of one rendering of that form (values, options, errors). The two
//! are split the same way the kernel's config is split from its runtime
//! state elsewhere in this workspace: spec describes, instance holds.

mod errors;
mod instance;
mod spec;

pub use errors::FormError;
pub use instance::FormInstance;
pub use spec::{FormSpec, FormValues, Populator};
