//! Structured configuration issues.
//!
//! Loaders report problems as [`ConfigIssue`]s instead of failing on the
//! first one, so the binary can print every issue before aborting.

use std::fmt;

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the run cannot start.
    Error,
    /// Non-fatal: the run works but may not behave as expected.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigIssueCode {
    /// `editor.policy` is neither `fast` nor `quality`.
    InvalidEditPolicy,
    /// `editor.passes` is zero.
    ZeroPasses,
    /// `batch.max_workers` is zero.
    ZeroWorkers,
    /// `batch.max_workers` exceeds the backend rate-limit cap.
    WorkersAboveCap,
    /// `providers.request_timeout_secs` is zero.
    ZeroTimeout,
    /// No critic backend has credentials.
    NoCredentials,
}

/// A detected issue in the loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {}", label, self.message)
    }
}

/// Whether any issue in the list is fatal.
pub fn has_errors(issues: &[ConfigIssue]) -> bool {
    issues.iter().any(ConfigIssue::is_error)
}
