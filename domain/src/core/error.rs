//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Tool already registered: {0}")]
    DuplicateTool(String),

    #[error("Invalid tool name: {0:?}")]
    InvalidToolName(String),

    #[error("Invalid input schema: {0}")]
    InvalidSchema(String),

    #[error("Invalid session transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },
}

impl DomainError {
    /// Check if this error was raised while building the tool catalog
    pub fn is_registration_error(&self) -> bool {
        matches!(
            self,
            DomainError::DuplicateTool(_)
                | DomainError::InvalidToolName(_)
                | DomainError::InvalidSchema(_)
        )
    }
}
