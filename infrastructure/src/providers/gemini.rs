//! Google Gemini adapters: the vision critic and the image generator.
//!
//! Both talk to `v1beta/models/{model}:generateContent` with the image sent
//! as an inline base64 part.

use super::http::{build_client, decode_base64, encode_base64, join_text, send_json};
use crate::config::BackendSettings;
use async_trait::async_trait;
use refract_application::{CriticBackend, CriticError, GenerationError, ImageGenerator};
use refract_domain::{Critique, GeneratedPart, GenerationRequest, ImageInput, critique_prompt, parse_critique};
use serde_json::{Value, json};
use tracing::debug;

fn endpoint(base_url: &str, model: &str) -> String {
    format!(
        "{}/v1beta/models/{}:generateContent",
        base_url.trim_end_matches('/'),
        model
    )
}

fn image_part(image: &ImageInput) -> Value {
    json!({
        "inline_data": {
            "mime_type": image.media_type,
            "data": encode_base64(&image.bytes),
        }
    })
}

/// Parts of the first candidate, or the block reason if the prompt was
/// rejected.
fn candidate_parts(body: &Value) -> Result<&Vec<Value>, String> {
    if let Some(reason) = body["promptFeedback"]["blockReason"].as_str() {
        return Err(format!("blocked: {}", reason));
    }
    body["candidates"][0]["content"]["parts"]
        .as_array()
        .ok_or_else(|| match body["candidates"][0]["finishReason"].as_str() {
            Some(reason) => format!("no content parts (finish reason {})", reason),
            None => "no content parts in response".to_string(),
        })
}

// ==================== Critic ====================

pub struct GeminiCritic {
    api_key: String,
    model: String,
    max_tokens: u32,
    endpoint: String,
    client: reqwest::Client,
}

impl GeminiCritic {
    pub fn new(settings: &BackendSettings) -> Result<Self, CriticError> {
        let api_key = settings
            .api_key
            .clone()
            .ok_or_else(|| CriticError::Configuration(format!("{} is not set", settings.api_key_env)))?;
        Ok(Self {
            api_key,
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
            endpoint: endpoint(&settings.base_url, &settings.model),
            client: build_client(settings.timeout).map_err(CriticError::Configuration)?,
        })
    }

    fn request_body(&self, image: &ImageInput) -> Value {
        json!({
            "contents": [{
                "parts": [
                    { "text": critique_prompt() },
                    image_part(image),
                ]
            }],
            "generationConfig": {
                "maxOutputTokens": self.max_tokens,
            }
        })
    }

    fn response_text(body: &Value) -> Result<String, CriticError> {
        let parts = candidate_parts(body).map_err(|_| CriticError::EmptyResponse)?;
        join_text(parts.iter().filter_map(|p| p["text"].as_str())).ok_or(CriticError::EmptyResponse)
    }
}

#[async_trait]
impl CriticBackend for GeminiCritic {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn analyze(&self, image: &ImageInput) -> Result<Critique, CriticError> {
        debug!(model = %self.model, bytes = image.len(), "Gemini critique request");
        let request = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&self.request_body(image));

        let body = send_json("gemini", request)
            .await
            .map_err(CriticError::Transport)?;
        let text = Self::response_text(&body)?;
        Ok(parse_critique(&text)?)
    }
}

// ==================== Image generator ====================

pub struct GeminiImageGenerator {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiImageGenerator {
    pub fn new(settings: &BackendSettings) -> Result<Self, GenerationError> {
        let api_key = settings.api_key.clone().ok_or_else(|| {
            GenerationError::Configuration(format!("{} is not set", settings.api_key_env))
        })?;
        Ok(Self {
            api_key,
            base_url: settings.base_url.clone(),
            client: build_client(settings.timeout).map_err(GenerationError::Configuration)?,
        })
    }

    fn request_body(request: &GenerationRequest) -> Value {
        let mut generation_config = json!({ "responseModalities": ["TEXT", "IMAGE"] });

        let mut image_config = serde_json::Map::new();
        if let Some(ratio) = &request.aspect_ratio {
            image_config.insert("aspectRatio".into(), json!(ratio));
        }
        if let Some(size) = &request.image_size {
            image_config.insert("imageSize".into(), json!(size));
        }
        if !image_config.is_empty() {
            generation_config["imageConfig"] = Value::Object(image_config);
        }

        json!({
            "contents": [{
                "parts": [
                    { "text": request.prompt },
                    image_part(&request.image),
                ]
            }],
            "generationConfig": generation_config,
        })
    }

    /// Convert response parts, accepting both camelCase and snake_case
    /// inline-data keys.
    fn parse_parts(body: &Value) -> Result<Vec<GeneratedPart>, GenerationError> {
        let raw_parts = candidate_parts(body).map_err(|reason| {
            if reason.starts_with("blocked") {
                GenerationError::Blocked(reason)
            } else {
                GenerationError::MalformedResponse(reason)
            }
        })?;

        let mut parts = Vec::with_capacity(raw_parts.len());
        for raw in raw_parts {
            let thought = raw["thought"].as_bool().unwrap_or(false);
            let inline = raw.get("inlineData").or_else(|| raw.get("inline_data"));

            if let Some(inline) = inline {
                let data = inline["data"].as_str().unwrap_or_default();
                let bytes = decode_base64(data).map_err(GenerationError::MalformedResponse)?;
                let mime_type = inline
                    .get("mimeType")
                    .or_else(|| inline.get("mime_type"))
                    .and_then(Value::as_str)
                    .unwrap_or("image/png");
                parts.push(if thought {
                    GeneratedPart::thought_image(bytes, mime_type)
                } else {
                    GeneratedPart::image(bytes, mime_type)
                });
            } else if let Some(text) = raw["text"].as_str() {
                let mut part = GeneratedPart::text(text);
                part.thought = thought;
                parts.push(part);
            }
        }
        Ok(parts)
    }
}

#[async_trait]
impl ImageGenerator for GeminiImageGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<Vec<GeneratedPart>, GenerationError> {
        debug!(
            model = %request.model,
            prompt_chars = request.prompt.len(),
            bytes = request.image.len(),
            "Gemini generation request"
        );
        let http = self
            .client
            .post(endpoint(&self.base_url, &request.model))
            .header("x-goog-api-key", &self.api_key)
            .json(&Self::request_body(request));

        let body = send_json("gemini-image", http)
            .await
            .map_err(GenerationError::Transport)?;
        Self::parse_parts(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use refract_application::RetryableError;
    use std::time::Duration;

    fn settings() -> BackendSettings {
        BackendSettings {
            name: "gemini",
            enabled: true,
            api_key_env: "GEMINI_API_KEY".into(),
            api_key: Some("test-key".into()),
            base_url: "https://example.test/".into(),
            model: "gemini-2.5-flash".into(),
            max_tokens: 1000,
            timeout: Duration::from_secs(5),
        }
    }

    fn image() -> ImageInput {
        ImageInput::new("dune.jpg", vec![0xFF, 0xD8, 0xFF], "image/jpeg")
    }

    #[test]
    fn test_endpoint_trims_slash() {
        assert_eq!(
            endpoint("https://example.test/", "m"),
            "https://example.test/v1beta/models/m:generateContent"
        );
    }

    #[test]
    fn test_missing_key_is_configuration_error() {
        let mut s = settings();
        s.api_key = None;
        assert!(matches!(GeminiCritic::new(&s), Err(CriticError::Configuration(_))));
        match GeminiImageGenerator::new(&s) {
            Err(e @ GenerationError::Configuration(_)) => {
                assert!(e.to_string().contains(&s.api_key_env));
                assert!(e.retry_message().is_none());
            }
            Err(other) => panic!("unexpected: {:?}", other),
            Ok(_) => panic!("generator built without a key"),
        }
    }

    #[test]
    fn test_critic_request_carries_prompt_and_image() {
        let critic = GeminiCritic::new(&settings()).unwrap();
        let body = critic.request_body(&image());
        let parts = &body["contents"][0]["parts"];
        assert_eq!(parts[0]["text"], critique_prompt());
        assert_eq!(parts[1]["inline_data"]["mime_type"], "image/jpeg");
        assert_eq!(parts[1]["inline_data"]["data"], "/9j/");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 1000);
    }

    #[test]
    fn test_critic_response_text() {
        let body = json!({
            "candidates": [{ "content": { "parts": [
                { "text": "{\"score\": 70," },
                { "text": "\"improvements\": [], \"notes\": \"ok\"}" }
            ]}}]
        });
        let text = GeminiCritic::response_text(&body).unwrap();
        assert!(parse_critique(&text).is_ok());

        let empty = json!({ "candidates": [{ "content": { "parts": [{ "text": " " }] } }] });
        assert!(matches!(
            GeminiCritic::response_text(&empty),
            Err(CriticError::EmptyResponse)
        ));
        assert!(GeminiCritic::response_text(&json!({})).is_err());
    }

    #[test]
    fn test_generation_request_hints() {
        let mut request = GenerationRequest {
            prompt: "Lift shadows".into(),
            image: image(),
            model: "gemini-3-pro-image-preview".into(),
            aspect_ratio: Some("4:3".into()),
            image_size: None,
        };
        let body = GeminiImageGenerator::request_body(&request);
        let config = &body["generationConfig"];
        assert_eq!(config["responseModalities"], json!(["TEXT", "IMAGE"]));
        assert_eq!(config["imageConfig"]["aspectRatio"], "4:3");
        assert!(config["imageConfig"].get("imageSize").is_none());

        request.aspect_ratio = None;
        let body = GeminiImageGenerator::request_body(&request);
        assert!(body["generationConfig"].get("imageConfig").is_none());
    }

    #[test]
    fn test_parse_parts_keeps_thought_flag() {
        let body = json!({
            "candidates": [{ "content": { "parts": [
                { "text": "thinking", "thought": true },
                { "inlineData": { "mimeType": "image/png", "data": "iVBO" }, "thought": true },
                { "inline_data": { "mime_type": "image/jpeg", "data": "/9j/" } },
                { "text": "Here is the edit" }
            ]}}]
        });
        let parts = GeminiImageGenerator::parse_parts(&body).unwrap();
        assert_eq!(parts.len(), 4);
        assert!(parts[0].thought && !parts[0].has_data());
        assert!(parts[1].thought && parts[1].has_data());
        assert_eq!(parts[1].mime_type.as_deref(), Some("image/png"));
        assert!(!parts[2].thought);
        assert_eq!(parts[2].data.as_deref(), Some(&[0xFF, 0xD8, 0xFF][..]));
        assert_eq!(parts[3].text.as_deref(), Some("Here is the edit"));
    }

    #[test]
    fn test_parse_parts_blocked_and_malformed() {
        let blocked = json!({ "promptFeedback": { "blockReason": "SAFETY" } });
        assert!(matches!(
            GeminiImageGenerator::parse_parts(&blocked),
            Err(GenerationError::Blocked(_))
        ));

        let empty = json!({ "candidates": [{ "finishReason": "MAX_TOKENS" }] });
        match GeminiImageGenerator::parse_parts(&empty) {
            Err(GenerationError::MalformedResponse(msg)) => assert!(msg.contains("MAX_TOKENS")),
            other => panic!("unexpected: {:?}", other),
        }

        let bad_data = json!({ "candidates": [{ "content": { "parts": [
            { "inlineData": { "mimeType": "image/png", "data": "***" } }
        ]}}]});
        assert!(matches!(
            GeminiImageGenerator::parse_parts(&bad_data),
            Err(GenerationError::MalformedResponse(_))
        ));
    }
}
