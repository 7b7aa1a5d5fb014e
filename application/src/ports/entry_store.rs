//! Entry persistence and site regeneration ports.

use super::image_processor::ImageError;
use async_trait::async_trait;
use refract_domain::EntryMetadata;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Image error: {0}")]
    Image(#[from] ImageError),
}

impl From<std::io::Error> for PersistenceError {
    fn from(err: std::io::Error) -> Self {
        PersistenceError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        PersistenceError::Serialization(err.to_string())
    }
}

/// A processed photograph ready to be archived.
#[derive(Debug, Clone, Copy)]
pub struct NewEntry<'a> {
    pub original: &'a Path,
    pub edited: &'a Path,
    pub metadata: &'a EntryMetadata,
}

/// Permanent record of processed photographs.
///
/// Callers serialize `persist` calls; implementations need not be safe for
/// concurrent writes.
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Copy both images and write the metadata; returns the new entry id.
    async fn persist(&self, entry: NewEntry<'_>) -> Result<String, PersistenceError>;

    /// Number of entries currently stored.
    async fn count(&self) -> Result<usize, PersistenceError>;
}

/// Regenerates the published output from every stored entry.
#[async_trait]
pub trait SiteBuilder: Send + Sync {
    /// Returns the number of entries published.
    async fn rebuild(&self) -> Result<usize, PersistenceError>;
}
