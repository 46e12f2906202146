use thiserror::Error;

use crate::models::slot::Slot;

#[derive(Error, Debug)]
pub enum MeshError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Every violation found in the input, not just the first
    #[error("Validation error: {message}")]
    Validation { message: String, errors: Vec<String> },

    /// The request collides with existing state, e.g. an overlapping or
    /// already booked slot
    #[error("Conflict: {message}")]
    Conflict {
        message: String,
        existing: Option<Box<Slot>>,
    },

    /// The slot is in a state that does not allow the operation
    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("Database error: {0}")]
    Database(#[from] eyre::Report),

    #[error("Internal server error: {0}")]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl MeshError {
    pub fn validation(message: impl Into<String>) -> Self {
        MeshError::Validation {
            message: message.into(),
            errors: Vec::new(),
        }
    }

    pub fn validation_errors(message: impl Into<String>, errors: Vec<String>) -> Self {
        MeshError::Validation {
            message: message.into(),
            errors,
        }
    }

    pub fn conflict(message: impl Into<String>, existing: Option<Slot>) -> Self {
        MeshError::Conflict {
            message: message.into(),
            existing: existing.map(Box::new),
        }
    }

    pub fn slot_not_found() -> Self {
        MeshError::NotFound("Availability slot not found".to_string())
    }

    /// Message safe to show to API callers
    ///
    /// Store and internal failures are reported generically; their detail
    /// belongs in server logs only.
    pub fn public_message(&self) -> String {
        match self {
            MeshError::NotFound(message) | MeshError::PreconditionFailed(message) => message.clone(),
            MeshError::Validation { message, .. } | MeshError::Conflict { message, .. } => {
                message.clone()
            }
            MeshError::Database(_) | MeshError::Internal(_) => "Internal server error".to_string(),
        }
    }
}

pub type MeshResult<T> = Result<T, MeshError>;
