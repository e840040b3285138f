//! Error types for model change tracking.

use crate::types::ClassId;
use thiserror::Error;

/// Main error type for tracking operations.
#[derive(Debug, Error)]
pub enum ModelChangeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Method \"{0}\" should be implemented")]
    Unimplemented(String),

    #[error("Model not found: {class} #{id}")]
    ModelNotFound { class: ClassId, id: u64 },

    #[error("Model is not persisted: {0}")]
    NotPersisted(ClassId),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Handler error: {0}")]
    Handler(String),
}

impl From<serde_json::Error> for ModelChangeError {
    fn from(e: serde_json::Error) -> Self {
        ModelChangeError::Serialization(e.to_string())
    }
}

/// Result type for tracking operations.
pub type Result<T> = std::result::Result<T, ModelChangeError>;
