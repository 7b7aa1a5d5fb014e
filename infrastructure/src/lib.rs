//! Infrastructure layer for refract
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: HTTP critic backends, the Gemini image
//! generator, local image processing, filesystem storage, the run
//! journal and configuration file loading.

pub mod config;
pub mod imaging;
pub mod logging;
pub mod providers;
pub mod storage;

// Re-export commonly used types
pub use config::{
    BackendSettings, ConfigLoader, FileBackendConfig, FileBatchConfig, FileConfig,
    FileEditorConfig, FilePathsConfig, FileProvidersConfig,
};
pub use imaging::ImageCrateProcessor;
pub use logging::JsonlRunJournal;
pub use providers::{
    AnthropicCritic, CriticRegistry, GeminiCritic, GeminiImageGenerator, OpenAiCritic,
    SkippedBackend,
};
pub use storage::{FsEntryStore, FsInbox, JsonSiteIndex};
