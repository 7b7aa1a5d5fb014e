//! Image generator port
//!
//! Defines the interface for the generative image-editing backend.

use crate::retry::RetryableError;
use async_trait::async_trait;
use refract_domain::{GeneratedPart, GenerationRequest};
use thiserror::Error;

/// Errors that can occur during a generation call
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Request blocked: {0}")]
    Blocked(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl RetryableError for GenerationError {
    fn retry_message(&self) -> Option<String> {
        match self {
            GenerationError::Transport(_) => Some(self.to_string()),
            _ => None,
        }
    }
}

/// Generative image-editing backend
///
/// Returns the raw response parts; the orchestrator decides which part, if
/// any, holds the edited image.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<Vec<GeneratedPart>, GenerationError>;
}
