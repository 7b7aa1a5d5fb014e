//! Edit intensity and the `[TAG] action` improvement syntax.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Action synthesized when a critique offers nothing to edit.
pub const NATURAL_POLISH_ACTION: &str =
    "Apply natural polish: gentle, balanced enhancement of exposure and color";

/// How strongly an edit should be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    Subtle,
    #[default]
    Moderate,
    Significant,
}

impl Intensity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intensity::Subtle => "subtle",
            Intensity::Moderate => "moderate",
            Intensity::Significant => "significant",
        }
    }

    /// Upper-case label used inside edit prompts.
    pub fn label(&self) -> &'static str {
        match self {
            Intensity::Subtle => "SUBTLE",
            Intensity::Moderate => "MODERATE",
            Intensity::Significant => "SIGNIFICANT",
        }
    }

    /// Map a bracket tag (any case) to an intensity, `None` for unknown tags.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_lowercase().as_str() {
            "subtle" | "minor" | "light" => Some(Intensity::Subtle),
            "moderate" => Some(Intensity::Moderate),
            "significant" | "strong" | "major" | "severe" | "heavy" => Some(Intensity::Significant),
            _ => None,
        }
    }
}

impl fmt::Display for Intensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Intensity {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Intensity::from_tag(s).ok_or_else(|| DomainError::InvalidIntensity(s.to_string()))
    }
}

/// One edit instruction handed to the generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditAction {
    pub action: String,
    pub intensity: Intensity,
}

impl EditAction {
    pub fn new(action: impl Into<String>, intensity: Intensity) -> Self {
        Self {
            action: action.into(),
            intensity,
        }
    }

    pub fn natural_polish() -> Self {
        Self::new(NATURAL_POLISH_ACTION, Intensity::Subtle)
    }
}

impl fmt::Display for EditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.intensity.label(), self.action)
    }
}

/// Parse one improvement string.
///
/// A leading `[TAG]` with a known tag sets the intensity and is removed.
/// Without a recognized tag the whole text is kept at moderate intensity.
/// Returns `None` when nothing is left to do.
pub fn parse_improvement(text: &str) -> Option<EditAction> {
    let trimmed = text.trim();

    if let Some(rest) = trimmed.strip_prefix('[')
        && let Some(end) = rest.find(']')
        && let Some(intensity) = Intensity::from_tag(&rest[..end])
    {
        let action = rest[end + 1..].trim();
        return (!action.is_empty()).then(|| EditAction::new(action, intensity));
    }

    (!trimmed.is_empty()).then(|| EditAction::new(trimmed, Intensity::Moderate))
}

/// Parse an improvement list, synthesizing the natural-polish action when
/// nothing usable remains.
pub fn parse_improvements<S: AsRef<str>>(improvements: &[S]) -> Vec<EditAction> {
    let actions: Vec<EditAction> = improvements
        .iter()
        .filter_map(|imp| parse_improvement(imp.as_ref()))
        .collect();

    if actions.is_empty() {
        vec![EditAction::natural_polish()]
    } else {
        actions
    }
}
