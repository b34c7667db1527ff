//! Sink for errors the orchestrator degrades on silently

use std::sync::Mutex;

use tracing::error;

/// Receives errors that are logged instead of shown to the user
pub trait ErrorReporter: Send + Sync {
    fn report(&self, operation: &str, message: &str);
}

/// Reports through `tracing`
#[derive(Debug, Default)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, operation: &str, message: &str) {
        error!(%operation, "{}", message);
    }
}

/// Keeps every report, for tests
#[derive(Debug, Default)]
pub struct RecordingReporter {
    reports: Mutex<Vec<(String, String)>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(operation, message)` pairs in report order
    pub fn reports(&self) -> Vec<(String, String)> {
        self.reports.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl ErrorReporter for RecordingReporter {
    fn report(&self, operation: &str, message: &str) {
        if let Ok(mut reports) = self.reports.lock() {
            reports.push((operation.to_string(), message.to_string()));
        }
    }
}
