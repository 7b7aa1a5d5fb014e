//! Edit model policy.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which image model tier to use when no explicit model is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditPolicy {
    /// Cheaper, faster model
    Fast,
    /// Higher fidelity model (default)
    #[default]
    Quality,
}

impl EditPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            EditPolicy::Fast => "fast",
            EditPolicy::Quality => "quality",
        }
    }

    /// Resolve the model name: an explicit override always wins.
    pub fn resolve<'a>(&self, override_model: Option<&'a str>, fast: &'a str, quality: &'a str) -> &'a str {
        match override_model.map(str::trim).filter(|m| !m.is_empty()) {
            Some(model) => model,
            None => match self {
                EditPolicy::Fast => fast,
                EditPolicy::Quality => quality,
            },
        }
    }
}

impl fmt::Display for EditPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EditPolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fast" => Ok(EditPolicy::Fast),
            "quality" => Ok(EditPolicy::Quality),
            other => Err(DomainError::InvalidEditPolicy(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_quality() {
        assert_eq!(EditPolicy::default(), EditPolicy::Quality);
    }

    #[test]
    fn test_resolve() {
        assert_eq!(EditPolicy::Fast.resolve(None, "f", "q"), "f");
        assert_eq!(EditPolicy::Quality.resolve(None, "f", "q"), "q");
        assert_eq!(EditPolicy::Fast.resolve(Some("custom"), "f", "q"), "custom");
        assert_eq!(EditPolicy::Quality.resolve(Some("  "), "f", "q"), "q");
    }

    #[test]
    fn test_parse() {
        assert_eq!("FAST".parse::<EditPolicy>().unwrap(), EditPolicy::Fast);
        assert_eq!(" quality ".parse::<EditPolicy>().unwrap(), EditPolicy::Quality);
        assert_eq!(
            "cheap".parse::<EditPolicy>(),
            Err(DomainError::InvalidEditPolicy("cheap".to_string()))
        );
    }
}
