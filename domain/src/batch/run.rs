//! Batch run bookkeeping.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A discovered file that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidImage {
    pub path: PathBuf,
    pub error: String,
}

/// Result of the per-image pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageOutcome {
    pub path: PathBuf,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Entry id, when the image was persisted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_id: Option<String>,
}

impl ImageOutcome {
    pub fn success(path: impl Into<PathBuf>, entry_id: Option<String>) -> Self {
        Self {
            path: path.into(),
            success: true,
            error: None,
            entry_id,
        }
    }

    pub fn failure(path: impl Into<PathBuf>, error: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            success: false,
            error: Some(error.into()),
            entry_id: None,
        }
    }
}

/// Everything one pipeline invocation produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRun {
    pub invalid: Vec<InvalidImage>,
    pub outcomes: Vec<ImageOutcome>,
    pub dry_run: bool,
    /// Images never started because the run was cancelled
    pub skipped: usize,
    /// Site rebuild failure, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_error: Option<String>,
}

impl BatchRun {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Default::default()
        }
    }

    pub fn successful(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.success).count()
    }

    pub fn invalid_count(&self) -> usize {
        self.invalid.len()
    }

    pub fn summarize(&self, total_entries: usize) -> BatchSummary {
        BatchSummary {
            successful: self.successful(),
            failed: self.failed(),
            invalid: self.invalid_count(),
            skipped: self.skipped,
            total_entries,
            dry_run: self.dry_run,
            site_error: self.site_error.clone(),
        }
    }
}

/// Aggregate counts reported at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub successful: usize,
    pub failed: usize,
    pub invalid: usize,
    pub skipped: usize,
    /// Entries known to the store after the run
    pub total_entries: usize,
    pub dry_run: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_error: Option<String>,
}

impl BatchSummary {
    pub fn processed(&self) -> usize {
        self.successful + self.failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts() {
        let mut run = BatchRun::new(false);
        run.outcomes.push(ImageOutcome::success("a.jpg", Some("id".into())));
        run.outcomes.push(ImageOutcome::failure("b.jpg", "boom"));
        run.outcomes.push(ImageOutcome::success("c.jpg", None));
        run.invalid.push(InvalidImage {
            path: "d.jpg".into(),
            error: "truncated".into(),
        });

        let summary = run.summarize(12);
        assert_eq!(summary.successful, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.invalid, 1);
        assert_eq!(summary.total_entries, 12);
        assert_eq!(summary.processed(), 3);
        assert!(!summary.dry_run);
    }

    #[test]
    fn test_empty_run() {
        let summary = BatchRun::new(true).summarize(0);
        assert_eq!(summary, BatchSummary { dry_run: true, ..Default::default() });
    }
}
