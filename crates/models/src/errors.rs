use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("validation error: {0}")]
    Validation(String),
    /// `nextId` sits at the top of the id range and cannot advance.
    #[error("id counter exhausted at {0}")]
    IdsExhausted(u64),
}

impl ModelError {
    pub fn required(field: &str) -> Self { Self::Validation(format!("{} is required", field)) }
}
