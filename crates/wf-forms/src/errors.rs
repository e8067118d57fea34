use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormError {
    #[error("form has a cyclic dependency touching field '{0}'")]
    FormCycle(String),

    #[error("field '{field}' depends on undeclared field '{parent}'")]
    UnknownDependency { field: String, parent: String },

    #[error("duplicate field name '{0}'")]
    DuplicateField(String),

    #[error("populator for field '{0}' failed: {1}")]
    PopulatorFailed(String, String),

    #[error("unknown field '{0}'")]
    UnknownField(String),
}
