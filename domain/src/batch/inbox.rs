//! Inbox file filtering.

use std::path::Path;

/// Extensions always accepted from the inbox (lower-case).
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// Extensions accepted only when a HEIF decoder is available.
pub const HEIF_EXTENSIONS: &[&str] = &["heic", "heif"];

/// Whether a file name looks like a photograph the pipeline should pick up.
///
/// Hidden files are skipped; the extension check is case-insensitive.
pub fn is_candidate_image(path: &Path, heif_supported: bool) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    if name.starts_with('.') {
        return false;
    }

    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    let ext = ext.to_lowercase();

    IMAGE_EXTENSIONS.contains(&ext.as_str())
        || (heif_supported && HEIF_EXTENSIONS.contains(&ext.as_str()))
}
