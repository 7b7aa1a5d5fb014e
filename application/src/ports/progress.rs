//! Progress notification port
//!
//! Defines the interface for reporting progress during a batch run.

use refract_domain::{BatchSummary, ConsensusResult, EditResult};
use std::path::Path;

/// Step of the per-image pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Analyze,
    Edit,
    ReReview,
    Persist,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Analyze => "analyze",
            Stage::Edit => "edit",
            Stage::ReReview => "re-review",
            Stage::Persist => "persist",
        }
    }
}

/// Callback for progress updates
///
/// Implementations live in the presentation layer. Workers call these
/// concurrently from several tasks.
pub trait ProgressNotifier: Send + Sync {
    /// Called once discovery and validation are done
    fn on_run_start(&self, _valid: usize, _invalid: usize, _workers: usize) {}

    fn on_invalid_image(&self, _path: &Path, _error: &str) {}

    fn on_image_start(&self, _image: &str) {}

    fn on_stage(&self, _image: &str, _stage: Stage) {}

    /// Called when a critic backend starts for an image
    fn on_backend_start(&self, _image: &str, _backend: &str) {}

    fn on_backend_complete(&self, _image: &str, _backend: &str, _success: bool) {}

    fn on_critique(&self, _image: &str, _consensus: &ConsensusResult) {}

    fn on_edit(&self, _image: &str, _result: &EditResult) {}

    fn on_image_complete(&self, _image: &str, _success: bool, _detail: Option<&str>) {}

    fn on_site_rebuild(&self, _result: Result<usize, &str>) {}

    fn on_run_complete(&self, _summary: &BatchSummary) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {}
