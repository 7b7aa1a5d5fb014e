//! Filesystem layout from TOML (`[paths]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePathsConfig {
    /// Directory new photographs are dropped into
    pub inbox: PathBuf,
    /// Directory holding one sub-directory per stored entry
    pub processed: PathBuf,
    /// Directory the published index is written to
    pub site: PathBuf,
    /// Optional JSONL run journal path
    pub journal: Option<PathBuf>,
}

impl Default for FilePathsConfig {
    fn default() -> Self {
        Self {
            inbox: PathBuf::from("inbox"),
            processed: PathBuf::from("processed"),
            site: PathBuf::from("site/public"),
            journal: None,
        }
    }
}
