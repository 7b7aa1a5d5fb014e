//! Retry policy for remote backend calls.
//!
//! Only the decision logic lives here; the async executor that sleeps
//! between attempts is in the application layer.

use std::time::Duration;

/// Substrings (lower-case) that mark an error message as transient.
pub const RETRYABLE_PATTERNS: &[&str] = &[
    "rate limit",
    "quota",
    "too many requests",
    "429",
    "timeout",
    "temporarily unavailable",
    "service unavailable",
    "503",
    "500",
];

/// Predicate deciding whether an error message is worth retrying.
pub type RetryClassifier = fn(&str) -> bool;

/// Case-insensitive match against [`RETRYABLE_PATTERNS`].
pub fn is_retryable_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    RETRYABLE_PATTERNS.iter().any(|p| lower.contains(p))
}

/// Bounded exponential backoff without jitter.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retries after the first attempt (total calls <= max_retries + 1)
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub backoff_factor: f64,
    pub classifier: RetryClassifier,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(2),
            backoff_factor: 2.0,
            classifier: is_retryable_message,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_delay: Duration, backoff_factor: f64) -> Self {
        Self {
            max_retries,
            initial_delay,
            backoff_factor,
            ..Default::default()
        }
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO, 1.0)
    }

    pub fn with_classifier(mut self, classifier: RetryClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Delay before retry number `retry` (0-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = self.backoff_factor.max(0.0).powi(retry as i32);
        self.initial_delay.mul_f64(factor)
    }

    /// Decide what to do after attempt `attempt` (0-based) failed with `message`.
    ///
    /// Returns the delay to wait before the next attempt, or `None` to give up.
    pub fn next_delay(&self, attempt: u32, message: &str) -> Option<Duration> {
        if attempt >= self.max_retries || !(self.classifier)(message) {
            return None;
        }
        Some(self.delay_for(attempt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_patterns() {
        assert!(is_retryable_message("429 Too Many Requests"));
        assert!(is_retryable_message("Rate Limit exceeded"));
        assert!(is_retryable_message("Quota exhausted for project"));
        assert!(is_retryable_message("request TIMEOUT"));
        assert!(is_retryable_message("HTTP 503: Service Unavailable"));
        assert!(is_retryable_message("server returned 500"));
        assert!(is_retryable_message("backend temporarily unavailable"));
    }

    #[test]
    fn test_non_retryable() {
        assert!(!is_retryable_message("bad input"));
        assert!(!is_retryable_message("401 Unauthorized"));
        assert!(!is_retryable_message("Malformed response"));
    }

    #[test]
    fn test_default_policy() {
        let p = RetryPolicy::default();
        assert_eq!(p.max_retries, 3);
        assert_eq!(p.initial_delay, Duration::from_secs(2));
        assert_eq!(p.backoff_factor, 2.0);
    }

    #[test]
    fn test_exponential_delays() {
        let p = RetryPolicy::default();
        assert_eq!(p.delay_for(0), Duration::from_secs(2));
        assert_eq!(p.delay_for(1), Duration::from_secs(4));
        assert_eq!(p.delay_for(2), Duration::from_secs(8));
    }

    #[test]
    fn test_next_delay_stops_after_max_retries() {
        let p = RetryPolicy::default();
        assert_eq!(p.next_delay(0, "429"), Some(Duration::from_secs(2)));
        assert_eq!(p.next_delay(2, "429"), Some(Duration::from_secs(8)));
        assert_eq!(p.next_delay(3, "429"), None);
        assert_eq!(p.next_delay(0, "bad input"), None);
    }

    #[test]
    fn test_custom_classifier() {
        let p = RetryPolicy::default().with_classifier(|msg| msg.starts_with("flaky"));
        assert!(p.next_delay(0, "flaky disk").is_some());
        assert!(p.next_delay(0, "429").is_none());
    }

    #[test]
    fn test_none_policy() {
        assert_eq!(RetryPolicy::none().next_delay(0, "429"), None);
    }
}
