//! Image processor port
//!
//! Local, deterministic image operations: validation, re-encoding and the
//! fallback enhancement.

use refract_domain::{EditedImage, EnhancementPlan, ImageInput};
use std::sync::Arc;
use thiserror::Error;

/// Errors from local image processing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    #[error("Image too small: {len} bytes")]
    TooSmall { len: usize },

    #[error("Unrecognized image format")]
    UnknownFormat,

    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error("Image task failed: {0}")]
    Task(String),
}

/// Basic facts about a validated image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    pub mime_type: String,
    pub width: u32,
    pub height: u32,
}

/// Local image operations
///
/// Operations are CPU-bound and synchronous. Async callers go through
/// [`run_blocking`] so a full-resolution decode never stalls the runtime.
pub trait ImageProcessor: Send + Sync {
    /// Check that `bytes` exceed the minimum size, are a recognized format
    /// and fully decode.
    fn validate(&self, bytes: &[u8]) -> Result<ImageInfo, ImageError>;

    /// Apply the deterministic enhancement plan to `source`, encoding the
    /// result in the source's format.
    fn enhance(&self, source: &ImageInput, plan: &EnhancementPlan) -> Result<EditedImage, ImageError>;

    /// Decode and re-encode `source` unchanged (used when an edited output
    /// is unusable and the original must stand in for it).
    fn reencode(&self, source: &ImageInput) -> Result<EditedImage, ImageError>;
}

/// Run `op` against `processor` on the blocking thread pool.
pub async fn run_blocking<T, F>(processor: &Arc<dyn ImageProcessor>, op: F) -> Result<T, ImageError>
where
    T: Send + 'static,
    F: FnOnce(&dyn ImageProcessor) -> Result<T, ImageError> + Send + 'static,
{
    let processor = Arc::clone(processor);
    tokio::task::spawn_blocking(move || op(processor.as_ref()))
        .await
        .map_err(|e| ImageError::Task(e.to_string()))?
}
