//! Critic backend registry
//!
//! Builds the backends whose credentials are available, in the fixed order
//! gemini → openai → anthropic.

use super::anthropic::AnthropicCritic;
use super::gemini::GeminiCritic;
use super::openai::OpenAiCritic;
use crate::config::{BackendSettings, FileProvidersConfig};
use refract_application::{CriticBackend, CriticError};
use std::sync::Arc;
use tracing::{info, warn};

/// A backend that was not constructed, and why
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedBackend {
    pub name: &'static str,
    pub reason: String,
}

pub struct CriticRegistry {
    backends: Vec<Arc<dyn CriticBackend>>,
    skipped: Vec<SkippedBackend>,
}

impl CriticRegistry {
    pub fn from_config(config: &FileProvidersConfig) -> Self {
        let mut registry = Self {
            backends: Vec::new(),
            skipped: Vec::new(),
        };

        for settings in config.backends() {
            if !settings.enabled {
                registry.skip(settings.name, "disabled in config".to_string());
                continue;
            }
            if settings.api_key.is_none() {
                registry.skip(settings.name, format!("{} not set", settings.api_key_env));
                continue;
            }
            match Self::build(&settings, config) {
                Ok(backend) => {
                    info!("Critic backend enabled: {} ({})", settings.name, settings.model);
                    registry.backends.push(backend);
                }
                Err(e) => {
                    warn!("Could not initialize {} critic: {}", settings.name, e);
                    registry.skip(settings.name, e.to_string());
                }
            }
        }
        registry
    }

    fn build(
        settings: &BackendSettings,
        config: &FileProvidersConfig,
    ) -> Result<Arc<dyn CriticBackend>, CriticError> {
        Ok(match settings.name {
            "gemini" => Arc::new(GeminiCritic::new(settings)?),
            "openai" => Arc::new(OpenAiCritic::new(settings)?),
            "anthropic" => Arc::new(AnthropicCritic::new(settings, &config.anthropic_version)?),
            other => {
                return Err(CriticError::Configuration(format!(
                    "unknown critic backend '{}'",
                    other
                )));
            }
        })
    }

    fn skip(&mut self, name: &'static str, reason: String) {
        self.skipped.push(SkippedBackend { name, reason });
    }

    pub fn names(&self) -> Vec<&str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    pub fn skipped(&self) -> &[SkippedBackend] {
        &self.skipped
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    pub fn into_backends(self) -> Vec<Arc<dyn CriticBackend>> {
        self.backends
    }
}
