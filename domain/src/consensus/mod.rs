//! Consensus of several critic backends.

pub mod merge;
pub mod result;

pub use merge::{consensus_score, dedupe_improvements, merge_contexts, most_frequent, round_one_decimal};
pub use result::{BackendCritique, ConsensusResult, EDITOR_IMPROVEMENT_LIMIT};
