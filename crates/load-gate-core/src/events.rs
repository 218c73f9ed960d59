// crates/load-gate-core/src/events.rs
// ============================================================================
// Module: Run Events
// Description: Progress events emitted by the pipeline and their observers.
// Purpose: Decouple stage progress from how it is displayed or recorded.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! The pipeline reports each step as a [`RunEvent`]. Observers decide what to
//! do with them: the CLI renders them as console text, [`JsonLinesObserver`]
//! writes one JSON record per event, and [`CompositeObserver`] fans out to
//! several observers. Observers are infallible from the pipeline's point of
//! view; a writer failure is kept for the caller to inspect afterwards.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;

use serde::Serialize;

use crate::audit::AuditOutcome;
use crate::verdict::Verdict;

// ============================================================================
// SECTION: Events
// ============================================================================

/// One step of a load-gate run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunEvent {
    /// Configuration is in place and the run is starting.
    Started {
        /// Submit URL.
        post_address: String,
        /// Threshold in seconds.
        threshold_secs: u64,
    },
    /// The payload was read.
    PayloadLoaded {
        /// Resolved payload path.
        path: String,
        /// Indented payload, when display was requested.
        rendered: Option<String>,
    },
    /// The POST completed.
    Submitted {
        /// Round-trip time in seconds.
        elapsed_secs: f64,
        /// HTTP status.
        status: u16,
        /// Final response URL.
        url: String,
        /// Response headers.
        headers: Vec<(String, String)>,
        /// Response body.
        body: String,
    },
    /// The target URL was extracted.
    TargetResolved {
        /// Target URL.
        url: String,
    },
    /// Browser timing was read.
    Probed {
        /// `responseStart - navigationStart`, in milliseconds.
        backend_ms: f64,
        /// `domComplete - responseStart`, in milliseconds.
        frontend_ms: f64,
    },
    /// The browser stage was skipped.
    ProbeSkipped,
    /// The audit tool is about to run.
    AuditStarted {
        /// Display form of the invocation.
        command: String,
    },
    /// The audit tool finished or could not run.
    AuditFinished {
        /// Outcome of the invocation.
        outcome: AuditOutcome,
    },
    /// The run reached a verdict.
    Decided {
        /// Pass or fail.
        verdict: Verdict,
        /// Submit time in seconds.
        elapsed_secs: f64,
        /// Threshold in seconds.
        threshold_secs: u64,
    },
}

// ============================================================================
// SECTION: Observer Trait
// ============================================================================

/// Receives pipeline events in order.
pub trait RunObserver {
    /// Handles one event.
    fn on_event(&mut self, event: &RunEvent);
}

impl<T: RunObserver + ?Sized> RunObserver for &mut T {
    fn on_event(&mut self, event: &RunEvent) {
        (**self).on_event(event);
    }
}

impl<T: RunObserver + ?Sized> RunObserver for Box<T> {
    fn on_event(&mut self, event: &RunEvent) {
        (**self).on_event(event);
    }
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl RunObserver for NullObserver {
    fn on_event(&mut self, _event: &RunEvent) {}
}

// ============================================================================
// SECTION: JSON Lines Observer
// ============================================================================

/// Writes each event as one JSON object per line.
pub struct JsonLinesObserver<W: Write> {
    /// Output writer for event records.
    writer: W,
    /// First write failure, if any.
    error: Option<String>,
}

impl<W: Write> JsonLinesObserver<W> {
    /// Creates an observer writing to `writer`.
    pub const fn new(writer: W) -> Self {
        Self {
            writer,
            error: None,
        }
    }

    /// Returns the first write failure, if any.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Consumes the observer and returns the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Serializes and writes one record.
    fn write_record(&mut self, event: &RunEvent) -> Result<(), String> {
        serde_json::to_writer(&mut self.writer, event).map_err(|err| err.to_string())?;
        self.writer.write_all(b"\n").map_err(|err| err.to_string())?;
        self.writer.flush().map_err(|err| err.to_string())
    }
}

impl<W: Write> RunObserver for JsonLinesObserver<W> {
    fn on_event(&mut self, event: &RunEvent) {
        if self.error.is_some() {
            return;
        }
        if let Err(err) = self.write_record(event) {
            self.error = Some(err);
        }
    }
}

// ============================================================================
// SECTION: Composite Observer
// ============================================================================

/// Forwards every event to each inner observer in order.
#[derive(Default)]
pub struct CompositeObserver<'a> {
    /// Inner observers.
    observers: Vec<&'a mut dyn RunObserver>,
}

impl<'a> CompositeObserver<'a> {
    /// Creates an empty composite.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            observers: Vec::new(),
        }
    }

    /// Adds an observer.
    #[must_use]
    pub fn with(mut self, observer: &'a mut dyn RunObserver) -> Self {
        self.observers.push(observer);
        self
    }
}

impl RunObserver for CompositeObserver<'_> {
    fn on_event(&mut self, event: &RunEvent) {
        for observer in &mut self.observers {
            observer.on_event(event);
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
