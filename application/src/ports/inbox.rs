//! Inbox port
//!
//! The directory photographs are dropped into, plus a staging area for
//! edited images awaiting persistence.

use async_trait::async_trait;
use refract_domain::{EditedImage, ImageInput};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InboxError {
    #[error("I/O error on {path}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("Invalid image {path}: {reason}")]
    InvalidImage { path: PathBuf, reason: String },
}

impl InboxError {
    pub fn io(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        InboxError::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

#[async_trait]
pub trait Inbox: Send + Sync {
    /// Candidate images directly inside the inbox, sorted by file name.
    /// A missing inbox yields an empty list.
    async fn discover(&self) -> Result<Vec<PathBuf>, InboxError>;

    /// Fully decode the file to make sure it is a usable image.
    async fn validate(&self, path: &Path) -> Result<(), InboxError>;

    async fn read(&self, path: &Path) -> Result<ImageInput, InboxError>;

    /// Write an edited image next to the inbox for the store to pick up.
    async fn stage(&self, original: &Path, image: &EditedImage) -> Result<PathBuf, InboxError>;

    /// Delete a staged artifact (missing files are not an error).
    async fn discard(&self, staged: &Path) -> Result<(), InboxError>;

    /// Remove a processed original from the inbox.
    async fn remove(&self, path: &Path) -> Result<(), InboxError>;
}
