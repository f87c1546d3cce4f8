//! Error types for the calman ecosystem.

use thiserror::Error;

/// Errors that can occur in calman operations.
#[derive(Error, Debug)]
pub enum CalmanError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    #[error("Template index {0} out of bounds")]
    TemplateIndex(usize),
}

/// Result type alias for calman operations.
pub type CalmanResult<T> = Result<T, CalmanError>;
