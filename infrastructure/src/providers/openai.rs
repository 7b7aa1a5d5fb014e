//! OpenAI chat-completions vision critic.

use super::http::{build_client, encode_base64, join_text, send_json};
use crate::config::BackendSettings;
use async_trait::async_trait;
use refract_application::{CriticBackend, CriticError};
use refract_domain::{Critique, ImageInput, critique_prompt, parse_critique};
use serde_json::{Value, json};
use tracing::debug;

pub struct OpenAiCritic {
    api_key: String,
    model: String,
    max_tokens: u32,
    endpoint: String,
    client: reqwest::Client,
}

impl OpenAiCritic {
    pub fn new(settings: &BackendSettings) -> Result<Self, CriticError> {
        let api_key = settings
            .api_key
            .clone()
            .ok_or_else(|| CriticError::Configuration(format!("{} is not set", settings.api_key_env)))?;
        Ok(Self {
            api_key,
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
            endpoint: format!("{}/v1/chat/completions", settings.base_url.trim_end_matches('/')),
            client: build_client(settings.timeout).map_err(CriticError::Configuration)?,
        })
    }

    fn request_body(&self, image: &ImageInput) -> Value {
        let data_url = format!(
            "data:{};base64,{}",
            image.media_type,
            encode_base64(&image.bytes)
        );
        json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": critique_prompt() },
                    { "type": "image_url", "image_url": { "url": data_url } }
                ]
            }]
        })
    }

    fn response_text(body: &Value) -> Result<String, CriticError> {
        body["choices"][0]["message"]["content"]
            .as_str()
            .and_then(|text| join_text([text]))
            .ok_or(CriticError::EmptyResponse)
    }
}

#[async_trait]
impl CriticBackend for OpenAiCritic {
    fn name(&self) -> &str {
        "openai"
    }

    async fn analyze(&self, image: &ImageInput) -> Result<Critique, CriticError> {
        debug!(model = %self.model, bytes = image.len(), "OpenAI critique request");
        let request = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(image));

        let body = send_json("openai", request)
            .await
            .map_err(CriticError::Transport)?;
        let text = Self::response_text(&body)?;
        Ok(parse_critique(&text)?)
    }
}
