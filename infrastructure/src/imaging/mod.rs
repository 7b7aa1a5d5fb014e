//! Local image processing.

mod processor;

pub use processor::{COMPARISON_GAP, COMPARISON_HEIGHT, DEFAULT_JPEG_QUALITY, ImageCrateProcessor};
