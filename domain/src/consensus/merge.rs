//! Merge rules for combining several backend critiques.
//!
//! | Field | Rule |
//! |-------|------|
//! | score | Mean of successful scores, 1 decimal, 0 when none |
//! | improvements | Case-insensitive exact dedup, first occurrence wins |
//! | genre | Most frequent known value, ties go to the first seen |
//! | subject / mood | Longest non-empty value, ties go to the first seen |
//! | preserve | Order-preserving union |
//! | technical | Most frequent value per key |

use crate::critique::entities::{CritiqueContext, UNKNOWN_GENRE};
use std::collections::{BTreeMap, HashSet};

/// Round to one decimal place.
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Arithmetic mean of the scores, rounded to one decimal; `0.0` when empty.
pub fn consensus_score(scores: &[f64]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    round_one_decimal(scores.iter().sum::<f64>() / scores.len() as f64)
}

/// Normalization key used for improvement deduplication.
pub fn normalize_improvement(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Deduplicate improvements across backends.
///
/// Only exact matches after lower-casing and trimming are merged;
/// differently phrased suggestions for the same edit are kept apart.
pub fn dedupe_improvements<'a, I>(improvements: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut seen = HashSet::new();
    improvements
        .into_iter()
        .filter(|imp| seen.insert(normalize_improvement(imp)))
        .cloned()
        .collect()
}

/// Most frequent value; ties resolve to the value seen first.
pub fn most_frequent<'a, I>(values: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for value in values {
        match counts.iter_mut().find(|(v, _)| *v == value) {
            Some((_, count)) => *count += 1,
            None => counts.push((value, 1)),
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (value, count) in counts {
        if best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((value, count));
        }
    }
    best.map(|(v, _)| v.to_string())
}

/// Longest non-empty value; ties resolve to the value seen first.
fn longest<'a, I>(values: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best = "";
    for value in values {
        if value.chars().count() > best.chars().count() {
            best = value;
        }
    }
    best.to_string()
}

/// Merge the contexts reported by successful backends.
///
/// Returns `None` when no backend reported any context.
pub fn merge_contexts(contexts: &[&CritiqueContext]) -> Option<CritiqueContext> {
    if contexts.is_empty() {
        return None;
    }

    let genre = most_frequent(
        contexts
            .iter()
            .map(|c| c.genre.as_str())
            .filter(|g| !g.is_empty() && *g != UNKNOWN_GENRE),
    )
    .unwrap_or_else(|| UNKNOWN_GENRE.to_string());

    let subject = longest(contexts.iter().map(|c| c.subject.as_str()));
    let mood = longest(contexts.iter().map(|c| c.mood.as_str()));

    let mut seen = HashSet::new();
    let preserve = contexts
        .iter()
        .flat_map(|c| c.preserve.iter())
        .filter(|p| seen.insert(normalize_improvement(p)))
        .cloned()
        .collect();

    let mut keys: Vec<&String> = contexts.iter().flat_map(|c| c.technical.keys()).collect();
    keys.sort();
    keys.dedup();

    let technical: BTreeMap<String, String> = keys
        .into_iter()
        .filter_map(|key| {
            most_frequent(
                contexts
                    .iter()
                    .filter_map(|c| c.technical.get(key))
                    .map(String::as_str)
                    .filter(|v| !v.is_empty()),
            )
            .map(|value| (key.clone(), value))
        })
        .collect();

    Some(CritiqueContext {
        genre,
        subject,
        mood,
        preserve,
        technical,
    })
}
