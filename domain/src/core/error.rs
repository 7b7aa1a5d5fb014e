//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("No critic backends configured")]
    NoBackends,

    #[error("Invalid edit policy: {0} (expected \"fast\" or \"quality\")")]
    InvalidEditPolicy(String),

    #[error("Invalid intensity: {0}")]
    InvalidIntensity(String),

    #[error("Edit pass count must be at least 1")]
    InvalidPassCount,
}

impl DomainError {
    /// Check if this error is a configuration mistake the user can fix
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            DomainError::InvalidEditPolicy(_) | DomainError::InvalidPassCount
        )
    }
}
