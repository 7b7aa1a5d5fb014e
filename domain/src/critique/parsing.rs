//! Critique response parsing.
//!
//! Turns the free-form text returned by a vision backend into a validated
//! [`Critique`]. Pure domain logic: no I/O, no retries. Errors are split so
//! callers can tell a model that returned garbage
//! ([`CritiqueParseError::MalformedResponse`]) from one that returned JSON
//! with the wrong shape ([`CritiqueParseError::Validation`]).

use super::entities::{
    clamp_score, Critique, CritiqueContext, StructuredImprovement, DEFAULT_INTENSITY,
    DEFAULT_PRIORITY, UNKNOWN_GENRE,
};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

/// Keys every critique must carry.
pub const REQUIRED_KEYS: [&str; 3] = ["score", "improvements", "notes"];

const CONTEXT_KEYS: [&str; 5] = ["genre", "subject", "mood", "preserve", "technical_assessment"];

/// Maximum number of raw-response characters echoed in error messages.
const RAW_PREVIEW_CHARS: usize = 200;

/// Schema violations in an otherwise well-formed JSON response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Response is not a JSON object")]
    NotAnObject,

    #[error("Missing required keys: {}", .missing.join(", "))]
    MissingKeys { missing: Vec<String> },

    #[error("Score must be a number")]
    ScoreNotNumeric,

    #[error("Improvements must be a list")]
    ImprovementsNotList,

    #[error("Notes must be a string")]
    NotesNotString,
}

impl ValidationError {
    /// The offending field, when the violation is about a single field.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ValidationError::ScoreNotNumeric => Some("score"),
            ValidationError::ImprovementsNotList => Some("improvements"),
            ValidationError::NotesNotString => Some("notes"),
            ValidationError::NotAnObject | ValidationError::MissingKeys { .. } => None,
        }
    }
}

/// Why a backend response could not be turned into a [`Critique`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CritiqueParseError {
    #[error("Malformed response ({reason}): {}", preview(.raw))]
    MalformedResponse { raw: String, reason: String },

    #[error("Invalid critique: {0}")]
    Validation(#[from] ValidationError),
}

impl CritiqueParseError {
    /// The raw backend text, when the failure was a JSON syntax error.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            CritiqueParseError::MalformedResponse { raw, .. } => Some(raw),
            CritiqueParseError::Validation(_) => None,
        }
    }
}

fn preview(raw: &str) -> String {
    if raw.chars().count() <= RAW_PREVIEW_CHARS {
        return raw.to_string();
    }
    let head: String = raw.chars().take(RAW_PREVIEW_CHARS).collect();
    format!("{}...", head)
}

/// Remove the markdown wrapping models like to add around JSON.
///
/// Trims whitespace; when the text starts with a code fence the first and
/// last lines are dropped; a leading `json` language tag is stripped.
pub fn strip_response_wrapping(text: &str) -> String {
    let mut body = text.trim().to_string();

    if body.starts_with("```") {
        let lines: Vec<&str> = body.split('\n').collect();
        body = if lines.len() > 2 {
            lines[1..lines.len() - 1].join("\n")
        } else {
            String::new()
        };
    }

    if let Some(rest) = body.strip_prefix("json") {
        body = rest.trim().to_string();
    }

    body
}

/// Parse and validate a backend response.
///
/// # Example
///
/// ```
/// use refract_domain::critique::parse_critique;
///
/// let critique = parse_critique(r#"{"score": 140, "improvements": ["Boost contrast"], "notes": "ok"}"#).unwrap();
/// assert_eq!(critique.score, 100.0);
/// assert_eq!(critique.improvements, vec!["Boost contrast".to_string()]);
/// ```
pub fn parse_critique(text: &str) -> Result<Critique, CritiqueParseError> {
    let body = strip_response_wrapping(text);
    let value: Value =
        serde_json::from_str(&body).map_err(|e| CritiqueParseError::MalformedResponse {
            raw: text.to_string(),
            reason: e.to_string(),
        })?;

    critique_from_value(&value)
}

/// Validate an already-decoded JSON value as a critique.
pub fn critique_from_value(value: &Value) -> Result<Critique, CritiqueParseError> {
    let obj = value.as_object().ok_or(ValidationError::NotAnObject)?;

    let missing: Vec<String> = REQUIRED_KEYS
        .iter()
        .filter(|k| !obj.contains_key(**k))
        .map(|k| k.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::MissingKeys { missing }.into());
    }

    let score = obj["score"]
        .as_f64()
        .ok_or(ValidationError::ScoreNotNumeric)?;
    let entries = obj["improvements"]
        .as_array()
        .ok_or(ValidationError::ImprovementsNotList)?;
    let notes = obj["notes"]
        .as_str()
        .ok_or(ValidationError::NotesNotString)?;

    let (improvements, structured_improvements) = normalize_improvements(entries);

    Ok(Critique {
        score: clamp_score(score),
        improvements,
        structured_improvements,
        notes: notes.to_string(),
        context: extract_context(obj),
    })
}

/// Flatten the improvement list.
///
/// Plain string lists pass through untouched. As soon as one entry is an
/// object the list is treated as structured: entries are stable-sorted by
/// priority (ascending, default 5) and rendered as `"[INTENSITY] action"`.
fn normalize_improvements(entries: &[Value]) -> (Vec<String>, Vec<StructuredImprovement>) {
    if !entries.iter().any(Value::is_object) {
        let plain = entries.iter().filter_map(value_as_text).collect();
        return (plain, Vec::new());
    }

    let mut structured: Vec<StructuredImprovement> = entries
        .iter()
        .filter_map(|entry| match entry {
            Value::Object(map) => structured_from_object(map),
            other => value_as_text(other).map(|action| StructuredImprovement {
                action,
                intensity: DEFAULT_INTENSITY.to_string(),
                priority: DEFAULT_PRIORITY,
                reason: String::new(),
            }),
        })
        .filter(|imp| !imp.action.is_empty())
        .collect();

    // sort_by is stable: equal priorities keep input order
    structured.sort_by(|a, b| a.priority.total_cmp(&b.priority));

    let rendered = structured.iter().map(StructuredImprovement::render).collect();
    (rendered, structured)
}

fn structured_from_object(map: &Map<String, Value>) -> Option<StructuredImprovement> {
    let action = map.get("action").and_then(value_as_text)?;

    let intensity = map
        .get("intensity")
        .and_then(Value::as_str)
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_INTENSITY.to_string());

    let priority = match map.get("priority") {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(DEFAULT_PRIORITY),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(DEFAULT_PRIORITY),
        _ => DEFAULT_PRIORITY,
    };

    let reason = map
        .get("reason")
        .and_then(value_as_text)
        .unwrap_or_default();

    Some(StructuredImprovement {
        action: action.trim().to_string(),
        intensity,
        priority,
        reason,
    })
}

fn extract_context(obj: &Map<String, Value>) -> Option<CritiqueContext> {
    if !CONTEXT_KEYS.iter().any(|k| obj.contains_key(*k)) {
        return None;
    }

    let text = |key: &str| {
        obj.get(key)
            .and_then(Value::as_str)
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    };

    let genre = text("genre").to_lowercase();
    let genre = if genre.is_empty() {
        UNKNOWN_GENRE.to_string()
    } else {
        genre
    };

    let mut seen = HashSet::new();
    let preserve = obj
        .get("preserve")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(value_as_text)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty() && seen.insert(s.to_lowercase()))
                .collect()
        })
        .unwrap_or_default();

    let technical: BTreeMap<String, String> = obj
        .get("technical_assessment")
        .and_then(Value::as_object)
        .map(|map| {
            map.iter()
                .filter_map(|(k, v)| value_as_text(v).map(|v| (k.clone(), v)))
                .collect()
        })
        .unwrap_or_default();

    Some(CritiqueContext {
        genre,
        subject: text("subject"),
        mood: text("mood"),
        preserve,
        technical,
    })
}

/// Render a scalar JSON value as text; `null` yields `None`.
fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_plain_response() {
        let response = json!({
            "score": 85,
            "improvements": ["Increase brightness", "Boost contrast"],
            "notes": "Good composition overall."
        })
        .to_string();

        let critique = parse_critique(&response).unwrap();
        assert_eq!(critique.score, 85.0);
        assert_eq!(critique.improvements, vec!["Increase brightness", "Boost contrast"]);
        assert!(critique.structured_improvements.is_empty());
        assert_eq!(critique.notes, "Good composition overall.");
        assert!(critique.context.is_none());
    }

    #[test]
    fn test_fenced_response_matches_unwrapped() {
        let raw = r#"{"score": 75, "improvements": ["Test improvement"], "notes": "Test notes"}"#;
        let fenced = format!("```json\n{}\n```", raw);

        assert_eq!(parse_critique(raw).unwrap(), parse_critique(&fenced).unwrap());
    }

    #[test]
    fn test_bare_fence_and_json_prefix() {
        let fenced = "```\n{\"score\": 60, \"improvements\": [], \"notes\": \"n\"}\n```";
        assert_eq!(parse_critique(fenced).unwrap().score, 60.0);

        let prefixed = "json\n{\"score\": 90, \"improvements\": [\"Test\"], \"notes\": \"Notes\"}";
        assert_eq!(parse_critique(prefixed).unwrap().score, 90.0);
    }

    #[test]
    fn test_parse_is_idempotent() {
        let response = json!({
            "score": 64.5,
            "improvements": [
                {"action": "Warm the tones", "intensity": "subtle", "priority": 2},
                {"action": "Recover highlights", "intensity": "significant", "priority": 1}
            ],
            "notes": "n",
            "genre": "Landscape"
        })
        .to_string();

        assert_eq!(parse_critique(&response).unwrap(), parse_critique(&response).unwrap());
    }

    #[test]
    fn test_score_clamped() {
        let high = json!({"score": 150, "improvements": [], "notes": ""}).to_string();
        let low = json!({"score": -20, "improvements": [], "notes": ""}).to_string();
        assert_eq!(parse_critique(&high).unwrap().score, 100.0);
        assert_eq!(parse_critique(&low).unwrap().score, 0.0);
    }

    #[test]
    fn test_scores_always_within_bounds() {
        for raw in [-1e9, -0.5, 0.0, 33.3, 100.0, 100.01, 1e12] {
            let response = json!({"score": raw, "improvements": [], "notes": ""}).to_string();
            let score = parse_critique(&response).unwrap().score;
            assert!((0.0..=100.0).contains(&score), "{} escaped bounds", score);
        }
    }

    #[test]
    fn test_malformed_json_keeps_raw_text() {
        let err = parse_critique("The photo is lovely!").unwrap_err();
        assert!(matches!(err, CritiqueParseError::MalformedResponse { .. }));
        assert_eq!(err.raw_response(), Some("The photo is lovely!"));
    }

    #[test]
    fn test_missing_keys() {
        let err = parse_critique(r#"{"score": 80}"#).unwrap_err();
        match err {
            CritiqueParseError::Validation(ValidationError::MissingKeys { missing }) => {
                assert_eq!(missing, vec!["improvements", "notes"]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_each_type_violation_names_its_field() {
        let cases = [
            (json!({"score": "high", "improvements": [], "notes": ""}), "score"),
            (json!({"score": 50, "improvements": "more light", "notes": ""}), "improvements"),
            (json!({"score": 50, "improvements": [], "notes": 3}), "notes"),
        ];

        for (value, field) in cases {
            let err = parse_critique(&value.to_string()).unwrap_err();
            match err {
                CritiqueParseError::Validation(v) => assert_eq!(v.field(), Some(field)),
                other => panic!("unexpected error: {:?}", other),
            }
        }
    }

    #[test]
    fn test_non_object_rejected() {
        let err = parse_critique("[1, 2, 3]").unwrap_err();
        assert_eq!(
            err,
            CritiqueParseError::Validation(ValidationError::NotAnObject)
        );
    }

    #[test]
    fn test_structured_improvements_sorted_by_priority() {
        let response = json!({
            "score": 70,
            "improvements": [
                {"action": "third", "intensity": "subtle", "priority": 3, "reason": "r3"},
                {"action": "first", "intensity": "significant", "priority": 1, "reason": "r1"},
                {"action": "second", "priority": 2}
            ],
            "notes": "n"
        })
        .to_string();

        let critique = parse_critique(&response).unwrap();
        assert_eq!(
            critique.improvements,
            vec!["[SIGNIFICANT] first", "[MODERATE] second", "[SUBTLE] third"]
        );
        assert_eq!(critique.structured_improvements.len(), 3);
        assert_eq!(critique.structured_improvements[0].reason, "r1");
    }

    #[test]
    fn test_structured_default_priority_and_stable_ties() {
        let response = json!({
            "score": 70,
            "improvements": [
                {"action": "a"},
                {"action": "b", "priority": 5},
                {"action": "c", "priority": 9},
                {"action": "d", "priority": "1"}
            ],
            "notes": "n"
        })
        .to_string();

        let critique = parse_critique(&response).unwrap();
        assert_eq!(
            critique.improvements,
            vec!["[MODERATE] d", "[MODERATE] a", "[MODERATE] b", "[MODERATE] c"]
        );
    }

    #[test]
    fn test_context_extracted_with_defaults() {
        let response = json!({
            "score": 70,
            "improvements": [],
            "notes": "n",
            "subject": " an old fisherman ",
            "preserve": ["weathered skin", "Weathered skin", "net"],
            "technical_assessment": {"exposure": "slightly dark", "iso": 400, "noise": null}
        })
        .to_string();

        let ctx = parse_critique(&response).unwrap().context.unwrap();
        assert_eq!(ctx.genre, UNKNOWN_GENRE);
        assert_eq!(ctx.subject, "an old fisherman");
        assert_eq!(ctx.mood, "");
        assert_eq!(ctx.preserve, vec!["weathered skin", "net"]);
        assert_eq!(ctx.technical.get("exposure").unwrap(), "slightly dark");
        assert_eq!(ctx.technical.get("iso").unwrap(), "400");
        assert!(!ctx.technical.contains_key("noise"));
    }

    #[test]
    fn test_genre_normalized() {
        let response = json!({"score": 1, "improvements": [], "notes": "", "genre": " Portrait "})
            .to_string();
        let ctx = parse_critique(&response).unwrap().context.unwrap();
        assert_eq!(ctx.genre, "portrait");
    }

    #[test]
    fn test_error_preview_truncates() {
        let raw = "x".repeat(1000);
        let err = parse_critique(&raw).unwrap_err();
        assert!(err.to_string().len() < 400);
        assert_eq!(err.raw_response().map(str::len), Some(1000));
    }
}
