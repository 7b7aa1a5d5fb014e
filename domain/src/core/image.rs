//! In-memory image value object and media-type helpers.

use std::path::Path;

/// A photograph loaded into memory, ready to be sent to a backend.
///
/// The name is only used for diagnostics and for picking a file extension
/// when the image is persisted; backends only look at the bytes and the
/// media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInput {
    /// Display name (usually the original file name)
    pub name: String,
    /// Raw encoded bytes
    pub bytes: Vec<u8>,
    /// MIME type, e.g. `image/jpeg`
    pub media_type: String,
}

impl ImageInput {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>, media_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bytes,
            media_type: media_type.into(),
        }
    }

    /// Build an input whose media type is inferred from the file extension.
    pub fn from_path_bytes(path: &Path, bytes: Vec<u8>) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::new(name, bytes, media_type_for_path(path))
    }

    /// Size of the encoded payload in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Infer the media type from a file extension.
///
/// Unknown or missing extensions fall back to `image/jpeg`.
pub fn media_type_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "image/jpeg",
    }
}

/// File extension (without dot) conventionally used for a media type.
pub fn extension_for_media_type(media_type: &str) -> &'static str {
    match media_type.to_lowercase().as_str() {
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        _ => "jpg",
    }
}
