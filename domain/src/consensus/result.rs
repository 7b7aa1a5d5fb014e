//! Consensus value objects - immutable results of one multi-backend analysis.

use super::merge::{consensus_score, dedupe_improvements, merge_contexts};
use crate::critique::{Critique, CritiqueContext};
use serde::{Deserialize, Serialize};

/// Number of improvements handed to the editor.
pub const EDITOR_IMPROVEMENT_LIMIT: usize = 5;

/// Outcome of one backend for one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendCritique {
    /// Backend name (e.g. "gemini")
    pub backend: String,
    /// The parsed critique when the backend succeeded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub critique: Option<Critique>,
    /// Error message if failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BackendCritique {
    pub fn success(backend: impl Into<String>, critique: Critique) -> Self {
        Self {
            backend: backend.into(),
            critique: Some(critique),
            error: None,
        }
    }

    pub fn failure(backend: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            backend: backend.into(),
            critique: None,
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.critique.is_some()
    }

    /// Score, absent for failed backends
    pub fn score(&self) -> Option<f64> {
        self.critique.as_ref().map(|c| c.score)
    }

    /// Notes, or an explanation of the failure
    pub fn notes(&self) -> String {
        match (&self.critique, &self.error) {
            (Some(c), _) => c.notes.clone(),
            (None, Some(e)) => format!("Analysis failed: {}", e),
            (None, None) => "Analysis failed".to_string(),
        }
    }
}

/// Consensus of every configured backend for one image.
///
/// Built once by [`ConsensusResult::from_critiques`] and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusResult {
    /// Per-backend outcomes in invocation order
    pub critiques: Vec<BackendCritique>,
    /// Mean of successful scores (0 when every backend failed)
    pub consensus_score: f64,
    /// Deduplicated union of all improvements, first-seen order
    pub combined_improvements: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merged_context: Option<CritiqueContext>,
    /// `[BACKEND] notes` of each successful backend joined with ` | `
    pub summary: String,
}

impl ConsensusResult {
    pub fn from_critiques(critiques: Vec<BackendCritique>) -> Self {
        let successful: Vec<(&str, &Critique)> = critiques
            .iter()
            .filter_map(|c| c.critique.as_ref().map(|crit| (c.backend.as_str(), crit)))
            .collect();

        let scores: Vec<f64> = successful.iter().map(|(_, c)| c.score).collect();

        let combined_improvements =
            dedupe_improvements(successful.iter().flat_map(|(_, c)| c.improvements.iter()));

        let contexts: Vec<&CritiqueContext> = successful
            .iter()
            .filter_map(|(_, c)| c.context.as_ref())
            .collect();

        let summary = if successful.is_empty() {
            "No critiques available".to_string()
        } else {
            successful
                .iter()
                .map(|(name, c)| format!("[{}] {}", name.to_uppercase(), c.notes))
                .collect::<Vec<_>>()
                .join(" | ")
        };

        Self {
            consensus_score: consensus_score(&scores),
            combined_improvements,
            merged_context: merge_contexts(&contexts),
            summary,
            critiques,
        }
    }

    /// The improvements the editor receives (first five).
    pub fn editor_improvements(&self) -> &[String] {
        let end = self.combined_improvements.len().min(EDITOR_IMPROVEMENT_LIMIT);
        &self.combined_improvements[..end]
    }

    pub fn successful_count(&self) -> usize {
        self.critiques.iter().filter(|c| c.is_success()).count()
    }

    pub fn failed(&self) -> impl Iterator<Item = &BackendCritique> {
        self.critiques.iter().filter(|c| !c.is_success())
    }

    /// Whether at least one backend produced a critique
    pub fn has_any_success(&self) -> bool {
        self.successful_count() > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn critique(score: f64, improvements: &[&str]) -> Critique {
        Critique::new(
            score,
            improvements.iter().map(|s| s.to_string()).collect(),
            format!("notes {}", score),
        )
    }

    #[test]
    fn test_three_backends_average() {
        let result = ConsensusResult::from_critiques(vec![
            BackendCritique::success("gemini", critique(60.0, &[])),
            BackendCritique::success("openai", critique(80.0, &[])),
            BackendCritique::success("anthropic", critique(100.0, &[])),
        ]);
        assert_eq!(result.consensus_score, 80.0);
        assert_eq!(result.successful_count(), 3);
    }

    #[test]
    fn test_failed_backend_excluded_from_average() {
        let result = ConsensusResult::from_critiques(vec![
            BackendCritique::failure("gemini", "429 Too Many Requests"),
            BackendCritique::success("openai", critique(70.0, &["Lift shadows"])),
        ]);
        assert_eq!(result.consensus_score, 70.0);
        assert_eq!(result.critiques[0].score(), None);
        assert_eq!(
            result.critiques[0].notes(),
            "Analysis failed: 429 Too Many Requests"
        );
        assert_eq!(result.failed().count(), 1);
    }

    #[test]
    fn test_all_failed() {
        let result = ConsensusResult::from_critiques(vec![
            BackendCritique::failure("gemini", "boom"),
            BackendCritique::failure("openai", "boom"),
        ]);
        assert_eq!(result.consensus_score, 0.0);
        assert!(!result.has_any_success());
        assert!(result.combined_improvements.is_empty());
        assert!(result.merged_context.is_none());
        assert_eq!(result.summary, "No critiques available");
    }

    #[test]
    fn test_improvements_deduped_in_backend_order() {
        let result = ConsensusResult::from_critiques(vec![
            BackendCritique::success("gemini", critique(50.0, &["Boost contrast", "Crop left"])),
            BackendCritique::success("openai", critique(50.0, &["boost CONTRAST ", "Warm tones"])),
        ]);
        assert_eq!(
            result.combined_improvements,
            vec!["Boost contrast", "Crop left", "Warm tones"]
        );
    }

    #[test]
    fn test_editor_improvements_limited_to_five() {
        let result = ConsensusResult::from_critiques(vec![BackendCritique::success(
            "gemini",
            critique(50.0, &["a", "b", "c", "d", "e", "f", "g"]),
        )]);
        assert_eq!(result.combined_improvements.len(), 7);
        assert_eq!(result.editor_improvements(), &["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_summary_joins_notes() {
        let result = ConsensusResult::from_critiques(vec![
            BackendCritique::success("gemini", critique(40.0, &[])),
            BackendCritique::failure("openai", "down"),
            BackendCritique::success("anthropic", critique(60.0, &[])),
        ]);
        assert_eq!(result.summary, "[GEMINI] notes 40 | [ANTHROPIC] notes 60");
    }
}
