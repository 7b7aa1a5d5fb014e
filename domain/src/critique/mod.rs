//! Single-backend critique domain
//!
//! A critique is one vision backend's opinion of a photograph: a score, an
//! ordered list of edits, free-form notes and an optional understanding of
//! what the photograph is (genre, subject, mood, what to preserve).
//!
//! | Item | Purpose |
//! |------|---------|
//! | [`critique_prompt`] | Fixed prompt sent to every backend |
//! | [`parse_critique`] | Fence stripping, JSON validation, normalization |
//! | [`Critique`] | Normalized result |

pub mod entities;
pub mod parsing;
pub mod prompt;

pub use entities::{clamp_score, Critique, CritiqueContext, StructuredImprovement};
pub use parsing::{
    critique_from_value, parse_critique, strip_response_wrapping, CritiqueParseError,
    ValidationError,
};
pub use prompt::critique_prompt;
