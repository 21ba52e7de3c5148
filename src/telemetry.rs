//! Mining telemetry events and sinks.
//!
//! Each merged round and the end of a mining run produce a structured event
//! carrying the aggregate's size at that point. Sinks decide where events go;
//! the CLI either drops them or writes JSON lines to stderr.

use std::io;

use serde::{Deserialize, Serialize};

/// A structured telemetry event emitted while mining.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TelemetryEvent {
    /// A round was merged into the aggregate.
    RoundMerged {
        /// One-based number of the round.
        round: usize,
        /// Commits held after the merge.
        commits: usize,
        /// Issues held after the merge.
        issues: usize,
        /// Comments held across all issues after the merge.
        comments: usize,
        /// Page sizes charged so far.
        fetched_elements: usize,
    },
    /// Mining stopped.
    MiningFinished {
        /// Rounds merged in total.
        rounds: usize,
        /// Commits in the final aggregate.
        commits: usize,
        /// Issues in the final aggregate.
        issues: usize,
        /// Comments in the final aggregate.
        comments: usize,
        /// False when a round limit stopped mining before every stream
        /// was done.
        complete: bool,
    },
}

/// A sink that can record telemetry events.
pub trait TelemetrySink: Send + Sync {
    /// Records a telemetry event.
    fn record(&self, event: TelemetryEvent);
}

/// Telemetry sink that drops all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTelemetrySink;

impl TelemetrySink for NoopTelemetrySink {
    fn record(&self, _event: TelemetryEvent) {}
}

/// Records telemetry events to stderr as JSON lines (JSONL).
///
/// This is intended for local debugging and is not transmitted anywhere.
#[derive(Debug, Default)]
pub struct StderrJsonlTelemetrySink;

impl TelemetrySink for StderrJsonlTelemetrySink {
    fn record(&self, event: TelemetryEvent) {
        let Ok(serialised) = serde_json::to_string(&event) else {
            return;
        };

        let _ignored = writeln_stderr(&serialised);
    }
}

fn writeln_stderr(message: &str) -> io::Result<()> {
    use io::Write;

    let mut stderr = io::stderr().lock();
    writeln!(stderr, "{message}")
}

/// Sinks for asserting on recorded events.
#[cfg(any(test, feature = "test-support"))]
pub mod test_support {
    use std::sync::{Mutex, PoisonError};

    use super::{TelemetryEvent, TelemetrySink};

    /// Keeps every recorded event in memory.
    #[derive(Debug, Default)]
    pub struct RecordingTelemetrySink {
        events: Mutex<Vec<TelemetryEvent>>,
    }

    impl RecordingTelemetrySink {
        /// Removes and returns the events recorded so far.
        #[must_use]
        pub fn take(&self) -> Vec<TelemetryEvent> {
            self.events
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .drain(..)
                .collect()
        }
    }

    impl TelemetrySink for RecordingTelemetrySink {
        fn record(&self, event: TelemetryEvent) {
            self.events
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(event);
        }
    }
}
