//! Edit orchestrator configuration.
//!
//! Model names live here rather than in the orchestrator so the binary
//! can wire them from config files and flags.

use refract_domain::EditPolicy;
use serde::{Deserialize, Serialize};

pub const DEFAULT_FAST_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_QUALITY_MODEL: &str = "gemini-3-pro-image-preview";

/// Settings for [`EditOrchestrator`](crate::use_cases::edit_orchestrator::EditOrchestrator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Explicit model override; wins over the policy
    pub model: Option<String>,
    pub policy: EditPolicy,
    pub fast_model: String,
    pub quality_model: String,
    /// Output aspect-ratio hint, e.g. "4:3"
    pub aspect_ratio: Option<String>,
    /// Output size hint, e.g. "2K"
    pub image_size: Option<String>,
    /// Number of sequential edit passes (at least 1)
    pub passes: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            model: None,
            policy: EditPolicy::default(),
            fast_model: DEFAULT_FAST_MODEL.to_string(),
            quality_model: DEFAULT_QUALITY_MODEL.to_string(),
            aspect_ratio: None,
            image_size: None,
            passes: 1,
        }
    }
}

impl EditorConfig {
    /// The model the orchestrator will call.
    pub fn select_model(&self) -> &str {
        self.policy
            .resolve(self.model.as_deref(), &self.fast_model, &self.quality_model)
    }

    // ==================== Builder Methods ====================

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_policy(mut self, policy: EditPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_passes(mut self, passes: usize) -> Self {
        self.passes = passes.max(1);
        self
    }
}
