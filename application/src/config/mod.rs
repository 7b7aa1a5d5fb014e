//! Application-level configuration.
//!
//! - [`EditorConfig`]: model selection, output hints, pass count
//! - [`BatchConfig`]: worker cap and dry-run

pub mod batch_config;
pub mod editor_config;

pub use batch_config::{BatchConfig, DEFAULT_MAX_WORKERS, WORKER_CAP};
pub use editor_config::{DEFAULT_FAST_MODEL, DEFAULT_QUALITY_MODEL, EditorConfig};
