//! Directory-per-entry store.
//!
//! ```text
//! <processed>/
//!   20250301-142233-3fa1c09e/
//!     original.jpg
//!     edited.png
//!     metadata.json
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Local};
use refract_application::{EntryStore, NewEntry, PersistenceError};
use serde_json::{Value, json};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const METADATA_FILE: &str = "metadata.json";

/// `YYYYmmdd-HHMMSS-<8 hex>`; sorts chronologically.
pub fn entry_id(now: DateTime<Local>, suffix: u32) -> String {
    format!("{}-{:08x}", now.format("%Y%m%d-%H%M%S"), suffix)
}

/// Lower-cased extension of `path`, or `fallback`.
fn extension_of(path: &Path, fallback: &str) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

/// One readable entry directory.
#[derive(Debug, Clone)]
pub struct StoredEntry {
    pub dir: PathBuf,
    pub metadata: Value,
}

impl StoredEntry {
    /// Path of a file named by the metadata field `key`, if present.
    pub fn image_path(&self, key: &str) -> Option<PathBuf> {
        self.metadata[key].as_str().map(|name| self.dir.join(name))
    }
}

pub struct FsEntryStore {
    root: PathBuf,
}

impl FsEntryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn allocate_dir(&self) -> Result<(String, PathBuf), PersistenceError> {
        tokio::fs::create_dir_all(&self.root).await?;
        loop {
            let id = entry_id(Local::now(), rand::random::<u32>());
            let dir = self.root.join(&id);
            match tokio::fs::create_dir(&dir).await {
                Ok(()) => return Ok((id, dir)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn write_entry(
        &self,
        id: &str,
        dir: &Path,
        entry: NewEntry<'_>,
    ) -> Result<(), PersistenceError> {
        let original_image = format!("original.{}", extension_of(entry.original, "jpg"));
        let edited_image = format!("edited.{}", extension_of(entry.edited, "jpg"));

        tokio::fs::copy(entry.original, dir.join(&original_image)).await?;
        tokio::fs::copy(entry.edited, dir.join(&edited_image)).await?;

        let mut metadata = serde_json::to_value(entry.metadata)?;
        if let Value::Object(map) = &mut metadata {
            let original_filename = entry
                .original
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            map.insert("timestamp".into(), json!(Local::now().to_rfc3339()));
            map.insert("entry_id".into(), json!(id));
            map.insert("original_filename".into(), json!(original_filename));
            map.insert("original_image".into(), json!(original_image));
            map.insert("edited_image".into(), json!(edited_image));
        }

        let body = serde_json::to_string_pretty(&metadata)?;
        tokio::fs::write(dir.join(METADATA_FILE), body).await?;
        Ok(())
    }

    /// Every readable entry, newest first.
    ///
    /// Entries with missing or malformed metadata are skipped.
    pub async fn load_all(&self) -> Result<Vec<StoredEntry>, PersistenceError> {
        let mut dirs = match tokio::fs::read_dir(&self.root).await {
            Ok(d) => d,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut entries: Vec<(String, StoredEntry)> = Vec::new();
        while let Some(dir) = dirs.next_entry().await? {
            let path = dir.path().join(METADATA_FILE);
            let raw = match tokio::fs::read_to_string(&path).await {
                Ok(raw) => raw,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => {
                    warn!("Could not read {}: {}", path.display(), e);
                    continue;
                }
            };
            match serde_json::from_str::<Value>(&raw) {
                Ok(metadata) => {
                    let name = dir.file_name().to_string_lossy().into_owned();
                    entries.push((name, StoredEntry { dir: dir.path(), metadata }));
                }
                Err(e) => warn!("Skipping malformed {}: {}", path.display(), e),
            }
        }

        entries.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(entries.into_iter().map(|(_, v)| v).collect())
    }
}

#[async_trait]
impl EntryStore for FsEntryStore {
    async fn persist(&self, entry: NewEntry<'_>) -> Result<String, PersistenceError> {
        let (id, dir) = self.allocate_dir().await?;

        if let Err(e) = self.write_entry(&id, &dir, entry).await {
            if let Err(cleanup) = tokio::fs::remove_dir_all(&dir).await {
                warn!("Could not remove partial entry {}: {}", dir.display(), cleanup);
            }
            return Err(e);
        }

        debug!("Stored entry {} in {}", id, dir.display());
        Ok(id)
    }

    async fn count(&self) -> Result<usize, PersistenceError> {
        Ok(self.load_all().await?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use refract_domain::{BackendCritique, ConsensusResult, Critique, EntryMetadata};
    use std::fs;

    fn metadata() -> EntryMetadata {
        let consensus = ConsensusResult::from_critiques(vec![BackendCritique::success(
            "gemini",
            Critique::new(72.0, vec!["Lift shadows".into()], "Strong light"),
        )]);
        EntryMetadata::new(&consensus)
    }

    struct Fixture {
        _dir: tempfile::TempDir,
        original: PathBuf,
        edited: PathBuf,
        store: FsEntryStore,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let original = dir.path().join("Dune.JPG");
        let edited = dir.path().join("dune_edited.png");
        fs::write(&original, b"original").unwrap();
        fs::write(&edited, b"edited").unwrap();
        let store = FsEntryStore::new(dir.path().join("processed"));
        Fixture {
            _dir: dir,
            original,
            edited,
            store,
        }
    }

    #[test]
    fn test_entry_id_format() {
        let now = Local.with_ymd_and_hms(2025, 3, 1, 14, 22, 33).unwrap();
        assert_eq!(entry_id(now, 0x3fa1c09e), "20250301-142233-3fa1c09e");
        assert_eq!(entry_id(now, 0xab), "20250301-142233-000000ab");
    }

    #[tokio::test]
    async fn test_persist_layout_and_metadata() {
        let f = fixture();
        let metadata = metadata();
        let id = f
            .store
            .persist(NewEntry {
                original: &f.original,
                edited: &f.edited,
                metadata: &metadata,
            })
            .await
            .unwrap();

        assert_eq!(id.len(), "20250301-142233-3fa1c09e".len());
        let dir = f.store.root().join(&id);
        assert_eq!(fs::read(dir.join("original.jpg")).unwrap(), b"original");
        assert_eq!(fs::read(dir.join("edited.png")).unwrap(), b"edited");

        let saved: Value =
            serde_json::from_str(&fs::read_to_string(dir.join(METADATA_FILE)).unwrap()).unwrap();
        assert_eq!(saved["entry_id"], id.as_str());
        assert_eq!(saved["original_filename"], "Dune.JPG");
        assert_eq!(saved["original_image"], "original.jpg");
        assert_eq!(saved["edited_image"], "edited.png");
        assert_eq!(saved["score"], 72.0);
        assert!(saved["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_same_second_entries_get_distinct_ids() {
        let f = fixture();
        let metadata = metadata();
        let mut ids = Vec::new();
        for _ in 0..3 {
            let id = f
                .store
                .persist(NewEntry {
                    original: &f.original,
                    edited: &f.edited,
                    metadata: &metadata,
                })
                .await
                .unwrap();
            let suffix = id.rsplit('-').next().unwrap();
            assert_eq!(suffix.len(), 8);
            assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
            ids.push(id);
        }
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 3);
        assert_eq!(f.store.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_failed_copy_leaves_no_partial_entry() {
        let f = fixture();
        let metadata = metadata();
        let missing = f.edited.with_file_name("gone.png");
        let result = f
            .store
            .persist(NewEntry {
                original: &f.original,
                edited: &missing,
                metadata: &metadata,
            })
            .await;

        assert!(matches!(result, Err(PersistenceError::Io(_))));
        assert_eq!(fs::read_dir(f.store.root()).unwrap().count(), 0);
        assert_eq!(f.store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_count_and_load_all_newest_first() {
        let f = fixture();
        let root = f.store.root();
        for (id, score) in [("20240101-000000-00000001", 10), ("20250101-000000-00000002", 20)] {
            fs::create_dir_all(root.join(id)).unwrap();
            fs::write(root.join(id).join(METADATA_FILE), json!({ "score": score }).to_string())
                .unwrap();
        }
        fs::create_dir_all(root.join("broken")).unwrap();
        fs::write(root.join("broken").join(METADATA_FILE), "{not json").unwrap();
        fs::create_dir_all(root.join("empty")).unwrap();

        assert_eq!(f.store.count().await.unwrap(), 2);
        let all = f.store.load_all().await.unwrap();
        assert_eq!(all[0].metadata["score"], 20);
        assert_eq!(all[1].metadata["score"], 10);
        assert_eq!(all[0].dir, root.join("20250101-000000-00000002"));
        assert!(all[0].image_path("edited_image").is_none());
    }

    #[tokio::test]
    async fn test_missing_root_counts_zero() {
        let store = FsEntryStore::new("/nonexistent/refract/processed");
        assert_eq!(store.count().await.unwrap(), 0);
    }
}
