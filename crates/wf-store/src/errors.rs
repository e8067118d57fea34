use thiserror::Error;

/// DataStore's own error surface is intentionally small: timing out a pop
/// is normal ("no work, try again" per Section 5) and is represented as
/// `Ok(None)`, not an error variant here.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("serialization error: {0}")]
    Serialization(String),
}
