//! Batch configuration from TOML (`[batch]` section)

use refract_application::BatchConfig;
use refract_application::config::{DEFAULT_MAX_WORKERS, WORKER_CAP};
use refract_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBatchConfig {
    /// Clamped to 3 at run time
    pub max_workers: usize,
    pub dry_run: bool,
}

impl Default for FileBatchConfig {
    fn default() -> Self {
        Self {
            max_workers: DEFAULT_MAX_WORKERS,
            dry_run: false,
        }
    }
}

impl FileBatchConfig {
    pub fn to_batch_config(&self) -> (BatchConfig, Vec<ConfigIssue>) {
        let mut issues = Vec::new();

        if self.max_workers == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroWorkers,
                "batch.max_workers must be at least 1",
            ));
        } else if self.max_workers > WORKER_CAP {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::WorkersAboveCap,
                format!(
                    "batch.max_workers = {} exceeds the rate-limit cap, using {}",
                    self.max_workers, WORKER_CAP
                ),
            ));
        }

        let config = BatchConfig::default()
            .with_max_workers(self.max_workers)
            .with_dry_run(self.dry_run);
        (config, issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_converts_cleanly() {
        let (config, issues) = FileBatchConfig::default().to_batch_config();
        assert!(issues.is_empty());
        assert_eq!(config, BatchConfig::default());
    }

    #[test]
    fn test_zero_workers_is_error() {
        let file = FileBatchConfig {
            max_workers: 0,
            ..Default::default()
        };
        let (config, issues) = file.to_batch_config();
        assert_eq!(config.max_workers, 1);
        assert_eq!(issues[0].code, ConfigIssueCode::ZeroWorkers);
        assert!(issues[0].is_error());
    }

    #[test]
    fn test_many_workers_clamped_with_warning() {
        let file = FileBatchConfig {
            max_workers: 8,
            ..Default::default()
        };
        let (config, issues) = file.to_batch_config();
        assert_eq!(config.workers_for(5), WORKER_CAP);
        assert_eq!(issues[0].code, ConfigIssueCode::WorkersAboveCap);
        assert!(!issues[0].is_error());
    }
}
