//! Keyword-driven plan for the deterministic fallback enhancement.
//!
//! Keywords are scanned across the whole improvement list: a topic keyword
//! in one improvement and a direction keyword in another still combine.

use serde::{Deserialize, Serialize};

pub const BRIGHTEN: f64 = 1.15;
pub const DARKEN: f64 = 0.85;
pub const CONTRAST_UP: f64 = 1.2;
pub const CONTRAST_DOWN: f64 = 0.8;
pub const SATURATE: f64 = 1.2;
pub const DESATURATE: f64 = 0.8;
pub const SHARPEN: f64 = 1.3;

/// Enhancement factors; `None` leaves that property untouched.
///
/// A factor of 1.0 is the identity for every property.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EnhancementPlan {
    pub brightness: Option<f64>,
    pub contrast: Option<f64>,
    pub saturation: Option<f64>,
    pub sharpness: Option<f64>,
}

impl EnhancementPlan {
    pub fn from_improvements<S: AsRef<str>>(improvements: &[S]) -> Self {
        let lowered: Vec<String> = improvements
            .iter()
            .map(|i| i.as_ref().to_lowercase())
            .collect();
        let any = |words: &[&str]| lowered.iter().any(|imp| words.iter().any(|w| imp.contains(w)));

        let brightness = any(&["brightness", "exposure", "lighter", "darker"])
            .then(|| {
                if any(&["increase", "boost", "lighter"]) {
                    Some(BRIGHTEN)
                } else if any(&["decrease", "reduce", "darker"]) {
                    Some(DARKEN)
                } else {
                    None
                }
            })
            .flatten();

        let contrast = any(&["contrast"])
            .then(|| {
                if any(&["increase", "boost"]) {
                    Some(CONTRAST_UP)
                } else if any(&["decrease", "reduce", "soften"]) {
                    Some(CONTRAST_DOWN)
                } else {
                    None
                }
            })
            .flatten();

        let saturation = any(&["saturation", "vibrance", "color"])
            .then(|| {
                if any(&["increase", "boost", "vibrant"]) {
                    Some(SATURATE)
                } else if any(&["decrease", "reduce", "muted"]) {
                    Some(DESATURATE)
                } else {
                    None
                }
            })
            .flatten();

        let sharpness = (any(&["sharp", "clarity", "detail"]) && any(&["increase", "boost"]))
            .then_some(SHARPEN);

        Self {
            brightness,
            contrast,
            saturation,
            sharpness,
        }
    }

    /// Whether applying the plan leaves the image unchanged.
    pub fn is_identity(&self) -> bool {
        self.brightness.is_none()
            && self.contrast.is_none()
            && self.saturation.is_none()
            && self.sharpness.is_none()
    }
}
