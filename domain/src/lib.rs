//! Domain layer for refract
//!
//! This crate contains the pure logic of the critique → edit → publish loop.
//! It has no dependencies on infrastructure or presentation concerns and
//! performs no I/O.
//!
//! # Core Concepts
//!
//! ## Critique and consensus
//!
//! - **Critique**: one vision backend's score, edit suggestions and notes
//! - **Consensus**: the merge of every backend's critique for one photograph
//!
//! ## Editing
//!
//! - **Edit action**: an improvement with a parsed intensity
//! - **Pass**: one generation call; later passes consume the prior output
//! - **Fallback enhancement**: deterministic adjustments used when
//!   generation produces no usable image

pub mod batch;
pub mod config;
pub mod consensus;
pub mod core;
pub mod critique;
pub mod edit;
pub mod retry;

// Re-export commonly used types
pub use batch::{
    BatchRun, BatchSummary, EditInfo, EntryMetadata, ImageOutcome, InvalidImage, ReReview,
    is_candidate_image,
};
pub use config::{ConfigIssue, ConfigIssueCode, Severity, has_errors};
pub use consensus::{BackendCritique, ConsensusResult, EDITOR_IMPROVEMENT_LIMIT};
pub use core::{
    error::DomainError,
    image::{ImageInput, extension_for_media_type, media_type_for_path},
};
pub use critique::{
    Critique, CritiqueContext, CritiqueParseError, StructuredImprovement, ValidationError,
    critique_prompt, parse_critique,
};
pub use edit::{
    EditAction, EditPolicy, EditRequest, EditResult, EditedImage, EnhancementPlan, GeneratedPart,
    GenerationRequest, Intensity, MIN_IMAGE_BYTES,
};
pub use retry::{RetryClassifier, RetryPolicy, is_retryable_message};
