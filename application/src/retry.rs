//! Async retry executor
//!
//! Runs an operation under a [`RetryPolicy`], sleeping between attempts.

use refract_domain::RetryPolicy;
use std::future::Future;
use tracing::warn;

/// Errors that can take part in retry classification.
pub trait RetryableError: std::fmt::Display {
    /// Message matched against the policy's classifier.
    ///
    /// `None` marks the error as never retryable regardless of its text.
    fn retry_message(&self) -> Option<String> {
        Some(self.to_string())
    }
}

impl RetryableError for String {}

impl RetryableError for &str {}

/// Run `operation` until it succeeds, fails with a non-retryable error, or
/// the policy's retries are exhausted. The final error is returned as-is.
///
/// `name` identifies the operation in log output.
pub async fn execute<T, E, F, Fut>(policy: &RetryPolicy, name: &str, mut operation: F) -> Result<T, E>
where
    E: RetryableError,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt: u32 = 0;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                let delay = err
                    .retry_message()
                    .and_then(|msg| policy.next_delay(attempt, &msg));

                let Some(delay) = delay else {
                    return Err(err);
                };

                warn!(
                    operation = name,
                    attempt = attempt + 1,
                    max_retries = policy.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Retryable failure, backing off"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
