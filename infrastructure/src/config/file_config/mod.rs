//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! Conversion into application config types happens in `to_*` methods that
//! return the converted value alongside any [`ConfigIssue`]s.

mod batch;
mod editor;
mod paths;
mod providers;

pub use batch::FileBatchConfig;
pub use editor::FileEditorConfig;
pub use paths::FilePathsConfig;
pub use providers::{BackendSettings, FileBackendConfig, FileProvidersConfig};

use refract_domain::ConfigIssue;
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub paths: FilePathsConfig,
    pub providers: FileProvidersConfig,
    pub editor: FileEditorConfig,
    pub batch: FileBatchConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// Credentials are not checked here; see
    /// [`FileProvidersConfig::credential_issues`].
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        issues.extend(self.editor.to_editor_config().1);
        issues.extend(self.batch.to_batch_config().1);
        issues.extend(self.providers.validate());
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use refract_domain::{ConfigIssueCode, EditPolicy};
    use std::path::PathBuf;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[paths]
inbox = "incoming"
processed = "archive"
site = "public"

[providers]
request_timeout_secs = 60

[providers.gemini]
model = "gemini-2.5-pro"
max_tokens = 2048

[providers.anthropic]
enabled = false

[editor]
policy = "fast"
passes = 2
image_size = "2K"

[batch]
max_workers = 2
dry_run = true
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.paths.processed, PathBuf::from("archive"));
        assert_eq!(config.providers.request_timeout_secs, 60);
        assert_eq!(config.providers.gemini().max_tokens, 2048);
        assert!(!config.providers.anthropic().enabled);
        assert_eq!(config.editor.parse_policy().0, EditPolicy::Fast);
        assert_eq!(config.editor.passes, 2);
        assert_eq!(config.batch.max_workers, 2);
        assert!(config.batch.dry_run);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_default_config() {
        let config = FileConfig::default();
        assert_eq!(config.paths.inbox, PathBuf::from("inbox"));
        assert_eq!(config.batch.max_workers, 3);
        assert!(!config.batch.dry_run);
        assert_eq!(config.editor.passes, 1);
    }

    #[test]
    fn test_validate_valid_config() {
        let config = FileConfig::default();
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_validate_collects_every_issue() {
        let toml_str = r#"
[editor]
policy = "balanced"
passes = 0

[batch]
max_workers = 0
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        let codes: Vec<ConfigIssueCode> = config.validate().iter().map(|i| i.code).collect();
        assert_eq!(
            codes,
            vec![
                ConfigIssueCode::InvalidEditPolicy,
                ConfigIssueCode::ZeroPasses,
                ConfigIssueCode::ZeroWorkers,
            ]
        );
    }
}
