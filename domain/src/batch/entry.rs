//! Metadata persisted with every processed photograph.

use crate::consensus::{BackendCritique, ConsensusResult, round_one_decimal};
use crate::critique::CritiqueContext;
use serde::{Deserialize, Serialize};

/// Second consensus critique, run against the edited image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReReview {
    pub score: f64,
    pub improvements: Vec<String>,
    pub notes: String,
    pub consensus_score: f64,
    /// Re-review consensus minus the initial consensus (1 decimal)
    pub score_delta: f64,
    pub critiques: Vec<BackendCritique>,
    pub combined_improvements: Vec<String>,
}

impl ReReview {
    pub fn new(review: &ConsensusResult, initial_score: f64) -> Self {
        Self {
            score: review.consensus_score,
            improvements: review.editor_improvements().to_vec(),
            notes: review.summary.clone(),
            consensus_score: review.consensus_score,
            score_delta: round_one_decimal(review.consensus_score - initial_score),
            critiques: review.critiques.clone(),
            combined_improvements: review.combined_improvements.clone(),
        }
    }
}

/// How the edited image was produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditInfo {
    pub model: String,
    pub passes: usize,
    pub used_fallback: bool,
}

/// Metadata of one entry, as handed to the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryMetadata {
    pub score: f64,
    /// Editor-facing improvements (at most five)
    pub improvements: Vec<String>,
    pub notes: String,
    pub consensus_score: f64,
    pub combined_improvements: Vec<String>,
    pub critiques: Vec<BackendCritique>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<CritiqueContext>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub re_review: Option<ReReview>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edit: Option<EditInfo>,
}

impl EntryMetadata {
    pub fn new(consensus: &ConsensusResult) -> Self {
        Self {
            score: consensus.consensus_score,
            improvements: consensus.editor_improvements().to_vec(),
            notes: consensus.summary.clone(),
            consensus_score: consensus.consensus_score,
            combined_improvements: consensus.combined_improvements.clone(),
            critiques: consensus.critiques.clone(),
            context: consensus.merged_context.clone(),
            re_review: None,
            edit: None,
        }
    }

    pub fn with_re_review(mut self, re_review: Option<ReReview>) -> Self {
        self.re_review = re_review;
        self
    }

    pub fn with_edit(mut self, edit: EditInfo) -> Self {
        self.edit = Some(edit);
        self
    }
}
