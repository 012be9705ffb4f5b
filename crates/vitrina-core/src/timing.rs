//! Operation timing instrumentation.
//!
//! Explicit stopwatches started at the call site and finished when the
//! operation completes. Durations are logged through the `log` facade with
//! the operation name, so every timed span is attributable without any
//! cross-cutting wrapper machinery.

use std::time::Instant;

/// Stopwatch for one named operation.
///
/// `start` logs at debug level, `finish` logs the elapsed time at info
/// level and returns it in milliseconds. Dropping a timer without calling
/// `finish` records nothing; abandoned spans are not reported as complete.
///
/// # Examples
///
/// ```
/// use vitrina_core::OpTimer;
///
/// let timer = OpTimer::start("catalog load");
/// // ... do the work ...
/// let ms = timer.finish();
/// assert!(ms < 1_000);
/// ```
#[derive(Debug)]
pub struct OpTimer {
    operation: String,
    start: Instant,
}

impl OpTimer {
    /// Start timing a named operation.
    pub fn start(operation: impl Into<String>) -> Self {
        let operation = operation.into();
        log::debug!("{operation} started");
        Self {
            operation,
            start: Instant::now(),
        }
    }

    /// The operation name this timer was started with.
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Elapsed time so far, in milliseconds.
    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    /// Finish the span, log the duration, and return it in milliseconds.
    pub fn finish(self) -> u64 {
        let ms = self.elapsed_ms();
        log::info!("{} completed in {}ms", self.operation, ms);
        ms
    }

    /// Finish the span with an extra detail string (item counts, batch
    /// totals) appended to the log line.
    pub fn finish_with(self, detail: impl AsRef<str>) -> u64 {
        let ms = self.elapsed_ms();
        log::info!(
            "{} completed in {}ms ({})",
            self.operation,
            ms,
            detail.as_ref()
        );
        ms
    }
}
