//! Critic backend port
//!
//! Defines the interface for a single vision-analysis provider.

use crate::retry::RetryableError;
use async_trait::async_trait;
use refract_domain::{Critique, CritiqueParseError, ImageInput};
use thiserror::Error;

/// Errors that can occur while asking a backend for a critique
#[derive(Error, Debug)]
pub enum CriticError {
    /// Network or HTTP failure. The message carries the status code so the
    /// retry classifier can recognize 429/500/503.
    #[error("Transport error: {0}")]
    Transport(String),

    #[error(transparent)]
    Parse(#[from] CritiqueParseError),

    #[error("Backend returned no text content")]
    EmptyResponse,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl RetryableError for CriticError {
    fn retry_message(&self) -> Option<String> {
        match self {
            CriticError::Transport(_) => Some(self.to_string()),
            _ => None,
        }
    }
}

/// One vision backend
///
/// Implementations (Gemini, OpenAI, Anthropic) live in the infrastructure
/// layer. They send the image with the fixed critique prompt and return the
/// parsed, validated critique.
#[async_trait]
pub trait CriticBackend: Send + Sync {
    /// Short backend name used in logs and reports (e.g. "gemini")
    fn name(&self) -> &str;

    async fn analyze(&self, image: &ImageInput) -> Result<Critique, CriticError>;
}
