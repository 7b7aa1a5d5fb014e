//! Anthropic messages-API vision critic.

use super::http::{build_client, encode_base64, join_text, send_json};
use crate::config::BackendSettings;
use async_trait::async_trait;
use refract_application::{CriticBackend, CriticError};
use refract_domain::{Critique, ImageInput, critique_prompt, parse_critique};
use serde_json::{Value, json};
use tracing::debug;

pub struct AnthropicCritic {
    api_key: String,
    api_version: String,
    model: String,
    max_tokens: u32,
    endpoint: String,
    client: reqwest::Client,
}

impl AnthropicCritic {
    pub fn new(settings: &BackendSettings, api_version: &str) -> Result<Self, CriticError> {
        let api_key = settings
            .api_key
            .clone()
            .ok_or_else(|| CriticError::Configuration(format!("{} is not set", settings.api_key_env)))?;
        Ok(Self {
            api_key,
            api_version: api_version.to_string(),
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
            endpoint: format!("{}/v1/messages", settings.base_url.trim_end_matches('/')),
            client: build_client(settings.timeout).map_err(CriticError::Configuration)?,
        })
    }

    fn request_body(&self, image: &ImageInput) -> Value {
        json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "messages": [{
                "role": "user",
                "content": [
                    {
                        "type": "image",
                        "source": {
                            "type": "base64",
                            "media_type": image.media_type,
                            "data": encode_base64(&image.bytes),
                        }
                    },
                    { "type": "text", "text": critique_prompt() }
                ]
            }]
        })
    }

    fn response_text(body: &Value) -> Result<String, CriticError> {
        let blocks = body["content"].as_array().ok_or(CriticError::EmptyResponse)?;
        join_text(
            blocks
                .iter()
                .filter(|b| b["type"] == "text")
                .filter_map(|b| b["text"].as_str()),
        )
        .ok_or(CriticError::EmptyResponse)
    }
}

#[async_trait]
impl CriticBackend for AnthropicCritic {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn analyze(&self, image: &ImageInput) -> Result<Critique, CriticError> {
        debug!(model = %self.model, bytes = image.len(), "Anthropic critique request");
        let request = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.api_version)
            .json(&self.request_body(image));

        let body = send_json("anthropic", request)
            .await
            .map_err(CriticError::Transport)?;
        let text = Self::response_text(&body)?;
        Ok(parse_critique(&text)?)
    }
}
