//! Filesystem inbox.
//!
//! Photographs live directly in the inbox directory. Edited images are
//! staged in a hidden sub-directory until the entry store copies them.

use crate::imaging::ImageCrateProcessor;
use async_trait::async_trait;
use refract_application::{ImageProcessor, Inbox, InboxError};
use refract_domain::batch::HEIF_EXTENSIONS;
use refract_domain::{EditedImage, ImageInput, extension_for_media_type, is_candidate_image};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Staging directory name inside the inbox (hidden, so never discovered)
pub const STAGING_DIR: &str = ".refract-staging";

pub struct FsInbox {
    dir: PathBuf,
    heif_supported: bool,
    processor: ImageCrateProcessor,
}

impl FsInbox {
    /// HEIF files are picked up only when the image backend can decode them.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            heif_supported: HEIF_EXTENSIONS
                .iter()
                .all(|ext| ImageCrateProcessor::decodes_extension(ext)),
            processor: ImageCrateProcessor::default(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn staging_dir(&self) -> PathBuf {
        self.dir.join(STAGING_DIR)
    }
}

#[async_trait]
impl Inbox for FsInbox {
    async fn discover(&self) -> Result<Vec<PathBuf>, InboxError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Inbox {} does not exist", self.dir.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(InboxError::io(&self.dir, e)),
        };

        let mut found = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| InboxError::io(&self.dir, e))?
        {
            let path = entry.path();
            let is_file = entry
                .file_type()
                .await
                .map(|t| t.is_file())
                .unwrap_or(false);
            if is_file && is_candidate_image(&path, self.heif_supported) {
                found.push(path);
            }
        }
        found.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(found)
    }

    async fn validate(&self, path: &Path) -> Result<(), InboxError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| InboxError::io(path, e))?;

        let processor = self.processor.clone();
        let outcome = tokio::task::spawn_blocking(move || processor.validate(&bytes))
            .await
            .map_err(|e| InboxError::InvalidImage {
                path: path.to_path_buf(),
                reason: format!("validation task failed: {}", e),
            })?;

        outcome.map(|_| ()).map_err(|e| InboxError::InvalidImage {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    async fn read(&self, path: &Path) -> Result<ImageInput, InboxError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| InboxError::io(path, e))?;
        Ok(ImageInput::from_path_bytes(path, bytes))
    }

    async fn stage(&self, original: &Path, image: &EditedImage) -> Result<PathBuf, InboxError> {
        let staging = self.staging_dir();
        tokio::fs::create_dir_all(&staging)
            .await
            .map_err(|e| InboxError::io(&staging, e))?;

        let stem = original
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        let staged = staging.join(format!(
            "{}_edited.{}",
            stem,
            extension_for_media_type(&image.mime_type)
        ));

        tokio::fs::write(&staged, &image.bytes)
            .await
            .map_err(|e| InboxError::io(&staged, e))?;
        debug!("Staged {} ({} bytes)", staged.display(), image.bytes.len());
        Ok(staged)
    }

    async fn discard(&self, staged: &Path) -> Result<(), InboxError> {
        match tokio::fs::remove_file(staged).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(InboxError::io(staged, e)),
        }
    }

    async fn remove(&self, path: &Path) -> Result<(), InboxError> {
        tokio::fs::remove_file(path)
            .await
            .map_err(|e| InboxError::io(path, e))
    }
}
