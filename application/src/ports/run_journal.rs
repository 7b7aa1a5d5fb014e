//! Port for the machine-readable run journal.
//!
//! Separate from `tracing`: tracing carries human-readable diagnostics,
//! the journal records one structured event per pipeline step (JSONL).

use serde_json::Value;

/// A structured pipeline event.
#[derive(Debug, Clone)]
pub struct JournalEvent {
    /// Event type identifier (e.g. "image_started", "critique")
    pub event_type: &'static str,
    /// Event-specific fields
    pub payload: Value,
}

impl JournalEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Records pipeline events.
///
/// `record` is synchronous and infallible: journal failures must never
/// disturb the pipeline.
pub trait RunJournal: Send + Sync {
    fn record(&self, event: JournalEvent);
}

/// No-op implementation for tests and when the journal is disabled.
pub struct NoJournal;

impl RunJournal for NoJournal {
    fn record(&self, _event: JournalEvent) {}
}
