//! Retry observation and logging
//!
//! This module provides the `RetryObserver` trait for monitoring retry attempts
//! and a `LogObserver` implementation that records them through a [`Logger`].

use std::fmt::Display;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use crate::logging::{LogLevel, Logger, WriteOptions};

/// Observer trait for retry attempt events
///
/// Every callback receives the operation name so one observer can serve many
/// operations.
///
/// # Example
///
/// ```rust
/// use admkit_core::retry::RetryObserver;
/// use std::fmt::Display;
/// use std::time::Duration;
///
/// struct PrintObserver;
///
/// impl RetryObserver for PrintObserver {
///     fn on_attempt_start(&self, operation: &str, attempt: u32, max_attempts: u32) {
///         println!("{operation}: attempt {attempt}/{max_attempts}");
///     }
///
///     fn on_attempt_failed(
///         &self,
///         operation: &str,
///         attempt: u32,
///         error: &dyn Display,
///         next_delay: Option<Duration>,
///     ) {
///         println!("{operation}: attempt {attempt} failed: {error} (next in {next_delay:?})");
///     }
///
///     fn on_success(&self, _operation: &str, _attempt: u32, _total_duration: Duration) {}
///
///     fn on_exhausted(&self, _operation: &str, _attempts: u32, _error: &dyn Display, _continuing: bool) {}
/// }
/// ```
pub trait RetryObserver: Send + Sync {
    /// Called when an attempt is about to start
    fn on_attempt_start(&self, operation: &str, attempt: u32, max_attempts: u32);

    /// Called after every failed attempt
    ///
    /// `next_delay` is `None` when this was the final attempt.
    fn on_attempt_failed(
        &self,
        operation: &str,
        attempt: u32,
        error: &dyn Display,
        next_delay: Option<Duration>,
    );

    /// Called when the operation succeeds
    fn on_success(&self, operation: &str, attempt: u32, total_duration: Duration);

    /// Called when all attempts are used up
    ///
    /// `continuing` is true when the failure will be suppressed instead of
    /// returned to the caller.
    fn on_exhausted(&self, operation: &str, attempts: u32, error: &dyn Display, continuing: bool);

    /// Called when a predicate marks an error as not retryable
    fn on_cancelled(&self, operation: &str, attempt: u32, error: &dyn Display, continuing: bool) {
        let _ = (operation, attempt, error, continuing);
    }
}

/// A no-op observer that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpObserver;

impl RetryObserver for NoOpObserver {
    fn on_attempt_start(&self, _operation: &str, _attempt: u32, _max_attempts: u32) {}

    fn on_attempt_failed(
        &self,
        _operation: &str,
        _attempt: u32,
        _error: &dyn Display,
        _next_delay: Option<Duration>,
    ) {
    }

    fn on_success(&self, _operation: &str, _attempt: u32, _total_duration: Duration) {}

    fn on_exhausted(&self, _operation: &str, _attempts: u32, _error: &dyn Display, _continuing: bool) {
    }
}

/// Records retry events as log entries
///
/// # Log Levels
///
/// - failed attempt: WARNING, naming the operation, attempt and cause
/// - exhausted or non-retryable: ERROR
/// - success after a retry: INFO
/// - attempt start and first-try success: `tracing` debug only
///
/// A failing log write never disturbs the retried operation; it is reported
/// through `tracing` and dropped.
#[derive(Debug, Clone)]
pub struct LogObserver {
    logger: Logger,
}

impl LogObserver {
    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    fn record(&self, level: LogLevel, message: String, options: WriteOptions) {
        if let Err(e) = self.logger.write(level, message, options) {
            tracing::warn!(error = %e, "failed to record retry event");
        }
    }
}

impl RetryObserver for LogObserver {
    fn on_attempt_start(&self, operation: &str, attempt: u32, max_attempts: u32) {
        tracing::debug!(operation, attempt, max_attempts, "starting attempt");
    }

    fn on_attempt_failed(
        &self,
        operation: &str,
        attempt: u32,
        error: &dyn Display,
        next_delay: Option<Duration>,
    ) {
        let mut options = WriteOptions::new()
            .context("operation", operation)
            .context("attempt", attempt)
            .context("error", error.to_string());
        if let Some(delay) = next_delay {
            options = options.context("retry_in_ms", delay.as_millis() as u64);
        }

        self.record(
            LogLevel::Warning,
            format!("{} failed on attempt {}: {}", operation, attempt, error),
            options,
        );
    }

    fn on_success(&self, operation: &str, attempt: u32, total_duration: Duration) {
        if attempt > 1 {
            self.record(
                LogLevel::Info,
                format!("{} succeeded on attempt {}", operation, attempt),
                WriteOptions::new()
                    .context("operation", operation)
                    .context("attempt", attempt)
                    .context("total_duration_ms", total_duration.as_millis() as u64),
            );
        } else {
            tracing::debug!(
                operation,
                duration_ms = total_duration.as_millis() as u64,
                "succeeded on first attempt"
            );
        }
    }

    fn on_exhausted(&self, operation: &str, attempts: u32, error: &dyn Display, continuing: bool) {
        let outcome = if continuing { "continuing" } else { "giving up" };
        self.record(
            LogLevel::Error,
            format!(
                "{} failed after {} attempt{}, {}: {}",
                operation,
                attempts,
                if attempts == 1 { "" } else { "s" },
                outcome,
                error
            ),
            WriteOptions::new()
                .context("operation", operation)
                .context("attempts", attempts)
                .context("continue_on_error", continuing)
                .context("error", error.to_string()),
        );
    }

    fn on_cancelled(&self, operation: &str, attempt: u32, error: &dyn Display, continuing: bool) {
        let outcome = if continuing { "continuing" } else { "giving up" };
        self.record(
            LogLevel::Error,
            format!(
                "{} hit a non-retryable error on attempt {}, {}: {}",
                operation, attempt, outcome, error
            ),
            WriteOptions::new()
                .context("operation", operation)
                .context("attempt", attempt)
                .context("continue_on_error", continuing)
                .context("error", error.to_string()),
        );
    }
}

/// An observer that counts retry events
///
/// Useful for testing.
#[derive(Debug, Default)]
pub struct StatsObserver {
    attempt_starts: AtomicU32,
    failures: AtomicU32,
    successes: AtomicU32,
    exhaustions: AtomicU32,
    cancellations: AtomicU32,
}

impl StatsObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempt_starts(&self) -> u32 {
        self.attempt_starts.load(Ordering::SeqCst)
    }

    pub fn failures(&self) -> u32 {
        self.failures.load(Ordering::SeqCst)
    }

    pub fn successes(&self) -> u32 {
        self.successes.load(Ordering::SeqCst)
    }

    pub fn exhaustions(&self) -> u32 {
        self.exhaustions.load(Ordering::SeqCst)
    }

    pub fn cancellations(&self) -> u32 {
        self.cancellations.load(Ordering::SeqCst)
    }
}

impl RetryObserver for StatsObserver {
    fn on_attempt_start(&self, _operation: &str, _attempt: u32, _max_attempts: u32) {
        self.attempt_starts.fetch_add(1, Ordering::SeqCst);
    }

    fn on_attempt_failed(
        &self,
        _operation: &str,
        _attempt: u32,
        _error: &dyn Display,
        _next_delay: Option<Duration>,
    ) {
        self.failures.fetch_add(1, Ordering::SeqCst);
    }

    fn on_success(&self, _operation: &str, _attempt: u32, _total_duration: Duration) {
        self.successes.fetch_add(1, Ordering::SeqCst);
    }

    fn on_exhausted(&self, _operation: &str, _attempts: u32, _error: &dyn Display, _continuing: bool) {
        self.exhaustions.fetch_add(1, Ordering::SeqCst);
    }

    fn on_cancelled(&self, _operation: &str, _attempt: u32, _error: &dyn Display, _continuing: bool) {
        self.cancellations.fetch_add(1, Ordering::SeqCst);
    }
}

/// Implement RetryObserver for Arc<T> where T: RetryObserver
impl<T: RetryObserver + ?Sized> RetryObserver for std::sync::Arc<T> {
    fn on_attempt_start(&self, operation: &str, attempt: u32, max_attempts: u32) {
        (**self).on_attempt_start(operation, attempt, max_attempts)
    }

    fn on_attempt_failed(
        &self,
        operation: &str,
        attempt: u32,
        error: &dyn Display,
        next_delay: Option<Duration>,
    ) {
        (**self).on_attempt_failed(operation, attempt, error, next_delay)
    }

    fn on_success(&self, operation: &str, attempt: u32, total_duration: Duration) {
        (**self).on_success(operation, attempt, total_duration)
    }

    fn on_exhausted(&self, operation: &str, attempts: u32, error: &dyn Display, continuing: bool) {
        (**self).on_exhausted(operation, attempts, error, continuing)
    }

    fn on_cancelled(&self, operation: &str, attempt: u32, error: &dyn Display, continuing: bool) {
        (**self).on_cancelled(operation, attempt, error, continuing)
    }
}
