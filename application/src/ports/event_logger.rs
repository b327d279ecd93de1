//! Port for structured deliberation transcripts.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostics, while this port captures the run's full
//! event sequence in a machine-readable format (one record per
//! [`DeliberationEvent`]).

use council_domain::DeliberationEvent;

/// Port for recording every event of a deliberation run.
///
/// Implementations write each event as a single record (e.g., one JSONL
/// line). `log` is intentionally synchronous and non-fallible so that
/// transcript failures never disturb the pipeline itself.
pub trait EventLogger: Send + Sync {
    fn log(&self, event: &DeliberationEvent);
}

/// No-op implementation for tests and when transcripts are disabled.
pub struct NoEventLogger;

impl EventLogger for NoEventLogger {
    fn log(&self, _event: &DeliberationEvent) {}
}
