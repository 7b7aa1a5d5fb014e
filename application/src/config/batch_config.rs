//! Batch coordinator configuration.

use serde::{Deserialize, Serialize};

/// Upper bound on parallel images, set by third-party API rate limits.
pub const DEFAULT_MAX_WORKERS: usize = 3;

/// Hard ceiling on the worker pool; larger settings are clamped to it.
pub const WORKER_CAP: usize = DEFAULT_MAX_WORKERS;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    pub max_workers: usize,
    /// Stop after the critique step; nothing is edited, stored or removed
    pub dry_run: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_workers: DEFAULT_MAX_WORKERS,
            dry_run: false,
        }
    }
}

impl BatchConfig {
    /// Worker count for `images` valid images: `min(max_workers, 3, images)`,
    /// never below one.
    pub fn workers_for(&self, images: usize) -> usize {
        self.max_workers.min(WORKER_CAP).min(images).max(1)
    }

    pub fn with_max_workers(mut self, workers: usize) -> Self {
        self.max_workers = workers.max(1);
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workers_for() {
        let config = BatchConfig::default();
        assert_eq!(config.workers_for(5), 3);
        assert_eq!(config.workers_for(2), 2);
        assert_eq!(config.workers_for(0), 1);
        assert_eq!(config.with_max_workers(0).workers_for(5), 1);
    }

    #[test]
    fn test_workers_never_exceed_cap() {
        let config = BatchConfig::default().with_max_workers(8);
        assert_eq!(config.workers_for(5), WORKER_CAP);
        assert_eq!(config.workers_for(100), 3);
        assert_eq!(config.workers_for(2), 2);
    }
}
