use thiserror::Error;

/// Validation/serialization errors raised while constructing domain values.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for DomainError {
    fn from(e: serde_json::Error) -> Self {
        DomainError::SerializationError(e.to_string())
    }
}
