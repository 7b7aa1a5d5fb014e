//! Static site output: published images plus a JSON index of every entry.
//!
//! ```text
//! <site>/
//!   entries.json
//!   images/
//!     <id>-original.jpg
//!     <id>-edited.png
//!     <id>-comparison.jpg
//! ```

use super::entry_store::{FsEntryStore, StoredEntry};
use crate::imaging::ImageCrateProcessor;
use async_trait::async_trait;
use refract_application::{ImageError, PersistenceError, SiteBuilder};
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const INDEX_FILE: &str = "entries.json";
pub const IMAGES_DIR: &str = "images";

pub struct JsonSiteIndex {
    store: FsEntryStore,
    site: PathBuf,
    processor: ImageCrateProcessor,
}

/// Site-relative paths of one entry's published images.
struct WebImages {
    original: String,
    edited: String,
    comparison: String,
}

impl JsonSiteIndex {
    pub fn new(processed: impl Into<PathBuf>, site: impl Into<PathBuf>) -> Self {
        Self {
            store: FsEntryStore::new(processed),
            site: site.into(),
            processor: ImageCrateProcessor::default(),
        }
    }

    pub fn index_path(&self) -> PathBuf {
        self.site.join(INDEX_FILE)
    }

    pub fn site_dir(&self) -> &Path {
        &self.site
    }

    pub fn images_dir(&self) -> PathBuf {
        self.site.join(IMAGES_DIR)
    }

    async fn publish(&self, entry: &StoredEntry) -> Result<WebImages, PersistenceError> {
        let id = entry.metadata["entry_id"]
            .as_str()
            .map(str::to_string)
            .or_else(|| entry.dir.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_default();
        let missing = |key: &str| PersistenceError::Io(format!("{} has no {}", entry.dir.display(), key));
        let original = entry.image_path("original_image").ok_or_else(|| missing("original_image"))?;
        let edited = entry.image_path("edited_image").ok_or_else(|| missing("edited_image"))?;

        let images = self.images_dir();
        let original_name = format!("{}-original.{}", id, extension(&original));
        let edited_name = format!("{}-edited.{}", id, extension(&edited));
        let comparison_name = format!("{}-comparison.jpg", id);

        tokio::fs::copy(&original, images.join(&original_name)).await?;
        tokio::fs::copy(&edited, images.join(&edited_name)).await?;

        let original_bytes = tokio::fs::read(&original).await?;
        let edited_bytes = tokio::fs::read(&edited).await?;
        let processor = self.processor.clone();
        let comparison = tokio::task::spawn_blocking(move || {
            processor.comparison(&original_bytes, &edited_bytes)
        })
        .await
        .map_err(|e| ImageError::Task(e.to_string()))??;
        tokio::fs::write(images.join(&comparison_name), comparison).await?;

        Ok(WebImages {
            original: format!("{}/{}", IMAGES_DIR, original_name),
            edited: format!("{}/{}", IMAGES_DIR, edited_name),
            comparison: format!("{}/{}", IMAGES_DIR, comparison_name),
        })
    }
}

fn extension(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_else(|| "jpg".to_string())
}

#[async_trait]
impl SiteBuilder for JsonSiteIndex {
    async fn rebuild(&self) -> Result<usize, PersistenceError> {
        let entries = self.store.load_all().await?;
        let total = entries.len();

        tokio::fs::create_dir_all(self.images_dir()).await?;

        let mut published: Vec<Value> = Vec::with_capacity(total);
        for entry in &entries {
            let mut metadata = entry.metadata.clone();
            match self.publish(entry).await {
                Ok(web) => {
                    if let Value::Object(map) = &mut metadata {
                        map.insert("web_original".into(), json!(web.original));
                        map.insert("web_edited".into(), json!(web.edited));
                        map.insert("web_comparison".into(), json!(web.comparison));
                    }
                }
                // still listed, just without images
                Err(e) => warn!("Could not publish images for {}: {}", entry.dir.display(), e),
            }
            published.push(metadata);
        }

        let body = serde_json::to_string_pretty(&json!({
            "total": total,
            "entries": published,
        }))?;

        // write-then-rename so readers never see a half-written index
        let path = self.index_path();
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, body).await?;
        tokio::fs::rename(&tmp, &path).await?;

        info!("Site index rebuilt with {} entries at {}", total, path.display());
        Ok(total)
    }
}
