use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("duplicate node identifier(s): {0:?}")]
    DuplicateIdentifier(Vec<String>),
}
