//! Edit requests and results.

use super::intensity::EditAction;
use crate::core::image::ImageInput;
use crate::critique::CritiqueContext;

/// Generated images at or below this size are discarded without decoding.
pub const MIN_IMAGE_BYTES: usize = 100;

/// Whether a payload is large enough to be worth decoding.
pub fn passes_size_check(bytes: &[u8]) -> bool {
    bytes.len() > MIN_IMAGE_BYTES
}

/// Everything needed to run a (possibly multi-pass) edit.
#[derive(Debug, Clone)]
pub struct EditRequest {
    pub source: ImageInput,
    pub actions: Vec<EditAction>,
    pub context: Option<CritiqueContext>,
    pub model: String,
    pub aspect_ratio: Option<String>,
    pub image_size: Option<String>,
    pub passes: usize,
}

/// A single generation call sent to the image backend.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub image: ImageInput,
    pub model: String,
    pub aspect_ratio: Option<String>,
    pub image_size: Option<String>,
}

/// Final image of an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditedImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl EditedImage {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }
}

/// Outcome of [`EditRequest`] processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditResult {
    pub success: bool,
    pub image: Option<EditedImage>,
    pub used_fallback: bool,
    /// Generation passes that produced a valid image
    pub passes_completed: usize,
}

impl EditResult {
    pub fn generated(image: EditedImage, passes_completed: usize) -> Self {
        Self {
            success: true,
            image: Some(image),
            used_fallback: false,
            passes_completed,
        }
    }

    pub fn fallback(image: EditedImage, passes_completed: usize) -> Self {
        Self {
            success: true,
            image: Some(image),
            used_fallback: true,
            passes_completed,
        }
    }

    pub fn failed(passes_completed: usize) -> Self {
        Self {
            success: false,
            image: None,
            used_fallback: true,
            passes_completed,
        }
    }
}
