use std::fmt::Display;
use std::time::Instant;
use tracing::field::{display, Empty};
use tracing::{error, info, Span};

/// Logs how long an operation took when dropped.
///
/// The outcome is failure unless [`OperationTimer::complete`] was called, so early
/// returns, `?` and cancelled futures are all recorded. Recorded fields live on the
/// timer's span and appear as structured keys on the final record.
#[derive(Debug)]
pub struct OperationTimer {
    operation: &'static str,
    start: Instant,
    span: Span,
    outcome: Option<Result<(), String>>,
}

impl OperationTimer {
    pub fn start(operation: &'static str) -> Self {
        let span = tracing::info_span!(
            "operation",
            operation,
            search_term = Empty,
            target_url = Empty,
            url = Empty,
            result_length = Empty,
            responded = Empty,
            html_bytes = Empty,
            content_chars = Empty,
        );
        Self {
            operation,
            start: Instant::now(),
            span,
            outcome: None,
        }
    }

    /// Attach a field to the final record; later values for the same key win.
    /// Keys not declared on the span are ignored.
    pub fn record(&mut self, key: &'static str, value: impl Display) {
        self.span.record(key, display(value));
    }

    pub fn with_field(mut self, key: &'static str, value: impl Display) -> Self {
        self.record(key, value);
        self
    }

    pub fn complete(&mut self) {
        self.outcome = Some(Ok(()));
    }

    pub fn fail(&mut self, error: impl Display) {
        self.outcome = Some(Err(error.to_string()));
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for OperationTimer {
    fn drop(&mut self) {
        let duration_ms = self.elapsed_ms();
        match self.outcome.take() {
            Some(Ok(())) => info!(
                parent: &self.span,
                operation = self.operation,
                duration_ms,
                success = true,
                "{} completed in {:.0}ms",
                self.operation,
                duration_ms
            ),
            Some(Err(reason)) => error!(
                parent: &self.span,
                operation = self.operation,
                duration_ms,
                success = false,
                error = %reason,
                "{} failed after {:.0}ms: {}",
                self.operation,
                duration_ms,
                reason
            ),
            None => error!(
                parent: &self.span,
                operation = self.operation,
                duration_ms,
                success = false,
                "{} aborted after {:.0}ms",
                self.operation,
                duration_ms
            ),
        }
    }
}
