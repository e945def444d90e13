//! Retry execution engine
//!
//! Synchronous: attempts run on the calling thread and delays block it.

use std::fmt::Display;
use std::thread;
use std::time::Instant;

use crate::logging::Logger;

use super::error::RetryError;
use super::observer::{LogObserver, NoOpObserver, RetryObserver};
use super::policy::RetryPolicy;
use super::strategies::{calculate_delay, AlwaysRetry, RetryPredicate};

/// Run `work` up to `max_retries` times, logging failures through `logger`
///
/// `max_retries` counts total attempts; values of 0 or 1 both mean a single
/// attempt. Attempts follow each other without delay.
///
/// Returns `Ok(Some(value))` on success. Once attempts are exhausted the
/// final error is returned as [`RetryError::Exhausted`], unless
/// `continue_on_error` is set, in which case the failure is logged and
/// `Ok(None)` is returned instead.
pub fn invoke_with_error_handling<F, T, E>(
    logger: &Logger,
    operation: &str,
    max_retries: u32,
    continue_on_error: bool,
    work: F,
) -> Result<Option<T>, RetryError<E>>
where
    F: FnMut() -> Result<T, E>,
    E: Display,
{
    RetryExecutorBuilder::new(operation)
        .with_policy(RetryPolicy::attempts(max_retries))
        .with_observer(LogObserver::new(logger.clone()))
        .continue_on_error(continue_on_error)
        .build()
        .execute_or_continue(work)
}

/// Builder for configuring a `RetryExecutor`
///
/// # Example
///
/// ```rust
/// use admkit_core::retry::{MessagePredicate, RetryExecutorBuilder, RetryPolicy};
///
/// let executor = RetryExecutorBuilder::new("rsync")
///     .with_policy(RetryPolicy::fixed(3, 500))
///     .with_predicate(MessagePredicate::new(["timed out"]))
///     .continue_on_error(true)
///     .build();
/// ```
pub struct RetryExecutorBuilder<P = AlwaysRetry, O = NoOpObserver> {
    operation: String,
    policy: RetryPolicy,
    predicate: P,
    observer: O,
    jitter: bool,
    continue_on_error: bool,
}

impl RetryExecutorBuilder<AlwaysRetry, NoOpObserver> {
    /// Create a new builder for the named operation
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            policy: RetryPolicy::default(),
            predicate: AlwaysRetry,
            observer: NoOpObserver,
            jitter: true,
            continue_on_error: false,
        }
    }
}

impl<P, O> RetryExecutorBuilder<P, O> {
    /// Set the retry policy
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the total number of attempts, keeping the rest of the policy
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.policy.max_attempts = max_attempts;
        self
    }

    /// Set the retry predicate
    ///
    /// The predicate determines whether an error should be retried.
    pub fn with_predicate<P2>(self, predicate: P2) -> RetryExecutorBuilder<P2, O> {
        RetryExecutorBuilder {
            operation: self.operation,
            policy: self.policy,
            predicate,
            observer: self.observer,
            jitter: self.jitter,
            continue_on_error: self.continue_on_error,
        }
    }

    /// Set the observer
    ///
    /// The observer receives callbacks during retry execution.
    pub fn with_observer<O2>(self, observer: O2) -> RetryExecutorBuilder<P, O2> {
        RetryExecutorBuilder {
            operation: self.operation,
            policy: self.policy,
            predicate: self.predicate,
            observer,
            jitter: self.jitter,
            continue_on_error: self.continue_on_error,
        }
    }

    /// Enable or disable jitter. Enabled by default.
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Suppress the final failure in `execute_or_continue`
    pub fn continue_on_error(mut self, continue_on_error: bool) -> Self {
        self.continue_on_error = continue_on_error;
        self
    }

    /// Build the executor
    pub fn build(self) -> RetryExecutor<P, O> {
        RetryExecutor {
            operation: self.operation,
            policy: self.policy,
            predicate: self.predicate,
            observer: self.observer,
            jitter: self.jitter,
            continue_on_error: self.continue_on_error,
        }
    }
}

/// A retry executor with configurable policy, predicate, and observer
///
/// Use `RetryExecutorBuilder` to create an instance. An executor holds no
/// state between runs and can be reused.
pub struct RetryExecutor<P = AlwaysRetry, O = NoOpObserver> {
    operation: String,
    policy: RetryPolicy,
    predicate: P,
    observer: O,
    jitter: bool,
    continue_on_error: bool,
}

impl<P, O> RetryExecutor<P, O>
where
    O: RetryObserver,
{
    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Execute `op`, returning its value or the final error
    ///
    /// `continue_on_error` is ignored here; see `execute_or_continue`.
    pub fn execute<F, T, E>(&self, op: F) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Result<T, E>,
        E: Display,
        P: RetryPredicate<E>,
    {
        self.run(op, false)
    }

    /// Execute `op`, honoring `continue_on_error`
    ///
    /// With `continue_on_error`, a final failure yields `Ok(None)` after the
    /// observer has been told about it.
    pub fn execute_or_continue<F, T, E>(&self, op: F) -> Result<Option<T>, RetryError<E>>
    where
        F: FnMut() -> Result<T, E>,
        E: Display,
        P: RetryPredicate<E>,
    {
        match self.run(op, self.continue_on_error) {
            Ok(value) => Ok(Some(value)),
            Err(err) if self.continue_on_error => {
                tracing::debug!(
                    operation = %self.operation,
                    attempts = err.attempts(),
                    "suppressing failure"
                );
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    fn run<F, T, E>(&self, mut op: F, continuing: bool) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Result<T, E>,
        E: Display,
        P: RetryPredicate<E>,
    {
        let start = Instant::now();
        let max_attempts = self.policy.effective_attempts();
        let mut attempt = 1;

        loop {
            self.observer
                .on_attempt_start(&self.operation, attempt, max_attempts);

            let err = match op() {
                Ok(result) => {
                    self.observer
                        .on_success(&self.operation, attempt, start.elapsed());
                    return Ok(result);
                }
                Err(err) => err,
            };

            if !self.predicate.should_retry(&err) {
                self.observer
                    .on_cancelled(&self.operation, attempt, &err, continuing);
                return Err(RetryError::non_retryable(
                    self.operation.clone(),
                    attempt,
                    err,
                ));
            }

            if attempt >= max_attempts {
                self.observer
                    .on_attempt_failed(&self.operation, attempt, &err, None);
                self.observer
                    .on_exhausted(&self.operation, attempt, &err, continuing);
                return Err(RetryError::exhausted(
                    self.operation.clone(),
                    attempt,
                    err,
                    start.elapsed(),
                ));
            }

            let delay = calculate_delay(&self.policy, attempt, self.jitter);
            self.observer
                .on_attempt_failed(&self.operation, attempt, &err, Some(delay));

            if !delay.is_zero() {
                thread::sleep(delay);
            }
            attempt += 1;
        }
    }
}
