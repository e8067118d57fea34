use serde::{Deserialize, Serialize};

/// Execution backend a node prefers. `Ord` gives the priority order
/// Process > Thread > Cooperative required by loop-level pool selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Pool {
    Cooperative,
    Thread,
    Process,
}

impl Pool {
    pub fn highest_priority(pools: impl IntoIterator<Item = Pool>) -> Option<Pool> {
        pools.into_iter().max()
    }
}
