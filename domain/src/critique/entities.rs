//! Critique value objects produced by a single vision backend.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default priority for structured improvements that omit one.
pub const DEFAULT_PRIORITY: f64 = 5.0;

/// Default intensity label for structured improvements that omit one.
pub const DEFAULT_INTENSITY: &str = "moderate";

/// Genre used when a backend does not report one.
pub const UNKNOWN_GENRE: &str = "unknown";

/// An improvement as reported in structured form by a backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredImprovement {
    pub action: String,
    pub intensity: String,
    /// Lower value means higher priority
    pub priority: f64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,
}

impl StructuredImprovement {
    /// Render as the flat `"[INTENSITY] action"` form consumed by the editor.
    pub fn render(&self) -> String {
        format!("[{}] {}", self.intensity.to_uppercase(), self.action)
    }
}

/// What the backend understood the photograph to be.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CritiqueContext {
    pub genre: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub mood: String,
    /// Elements the editor must not alter (set semantics, insertion order kept)
    #[serde(default)]
    pub preserve: Vec<String>,
    /// Free-form technical assessment, e.g. `exposure -> "slightly under"`
    #[serde(default)]
    pub technical: BTreeMap<String, String>,
}

impl Default for CritiqueContext {
    fn default() -> Self {
        Self {
            genre: UNKNOWN_GENRE.to_string(),
            subject: String::new(),
            mood: String::new(),
            preserve: Vec::new(),
            technical: BTreeMap::new(),
        }
    }
}

impl CritiqueContext {
    /// Whether the genre is a real value rather than the placeholder.
    pub fn has_known_genre(&self) -> bool {
        !self.genre.is_empty() && self.genre != UNKNOWN_GENRE
    }
}

/// A normalized critique from one backend.
///
/// `score` is always within `[0, 100]`; [`parse_critique`](super::parse_critique)
/// is the only constructor used for backend output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Critique {
    pub score: f64,
    pub improvements: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub structured_improvements: Vec<StructuredImprovement>,
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<CritiqueContext>,
}

impl Critique {
    /// Build a critique directly (tests, mocks). The score is clamped.
    pub fn new(score: f64, improvements: Vec<String>, notes: impl Into<String>) -> Self {
        Self {
            score: clamp_score(score),
            improvements,
            structured_improvements: Vec::new(),
            notes: notes.into(),
            context: None,
        }
    }

    pub fn with_context(mut self, context: CritiqueContext) -> Self {
        self.context = Some(context);
        self
    }
}

/// Clamp a raw score into `[0, 100]`. NaN maps to 0.
pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        return 0.0;
    }
    score.clamp(0.0, 100.0)
}
