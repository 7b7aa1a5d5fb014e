//! Provider adapters for the vision and image-generation APIs.

pub mod anthropic;
pub mod gemini;
mod http;
pub mod openai;
pub mod registry;

pub use anthropic::AnthropicCritic;
pub use gemini::{GeminiCritic, GeminiImageGenerator};
pub use openai::OpenAiCritic;
pub use registry::{CriticRegistry, SkippedBackend};
