//! Retry delay strategies and predicates
//!
//! Delays are always bounded: the strategy result is capped at
//! `max_delay_ms`, and jitter adds at most a further 25%.

use rand::Rng;
use std::fmt::Display;
use std::time::Duration;

use super::policy::{RetryPolicy, RetryStrategy};

/// Calculate the delay before the next retry attempt
///
/// # Arguments
///
/// * `policy` - The retry policy containing strategy and timing parameters
/// * `attempt` - The attempt that just failed (1-indexed)
/// * `jitter` - Whether to apply random jitter to the delay
///
/// # Example
///
/// ```rust
/// use admkit_core::retry::{calculate_delay, RetryPolicy, RetryStrategy};
///
/// let policy = RetryPolicy {
///     max_attempts: 3,
///     strategy: RetryStrategy::ExponentialBackoff,
///     backoff_multiplier: 2.0,
///     initial_delay_ms: 1000,
///     max_delay_ms: 30000,
/// };
///
/// assert_eq!(calculate_delay(&policy, 1, false).as_millis(), 1000);
/// assert_eq!(calculate_delay(&policy, 2, false).as_millis(), 2000);
/// ```
pub fn calculate_delay(policy: &RetryPolicy, attempt: u32, jitter: bool) -> Duration {
    // Attempt is 1-indexed, but we want 0-indexed for calculations
    let attempt_index = attempt.saturating_sub(1);

    let base_delay_ms = match policy.strategy {
        RetryStrategy::None => 0,

        RetryStrategy::FixedDelay => policy.initial_delay_ms,

        RetryStrategy::ExponentialBackoff => {
            let multiplier = policy.backoff_multiplier.powf(attempt_index as f64);
            (policy.initial_delay_ms as f64 * multiplier) as u64
        }

        RetryStrategy::LinearBackoff => policy
            .initial_delay_ms
            .saturating_mul(attempt_index as u64 + 1),
    };

    let capped_delay_ms = base_delay_ms.min(policy.max_delay_ms);

    // Up to 25% random variation on top of the cap
    let final_delay_ms = if jitter && capped_delay_ms > 0 {
        let jitter_range = capped_delay_ms / 4;
        capped_delay_ms + rand::rng().random_range(0..=jitter_range)
    } else {
        capped_delay_ms
    };

    Duration::from_millis(final_delay_ms)
}

/// A predicate that determines whether an error should be retried
///
/// By default all errors are retryable. Use a predicate to stop early on
/// failures that another attempt cannot fix.
///
/// # Example
///
/// ```rust
/// use admkit_core::retry::RetryPredicate;
/// use std::io::{Error, ErrorKind};
///
/// struct IoRetryPredicate;
///
/// impl RetryPredicate<Error> for IoRetryPredicate {
///     fn should_retry(&self, error: &Error) -> bool {
///         !matches!(
///             error.kind(),
///             ErrorKind::NotFound | ErrorKind::PermissionDenied | ErrorKind::InvalidInput
///         )
///     }
/// }
/// ```
pub trait RetryPredicate<E: ?Sized>: Send + Sync {
    /// Determine whether the given error should be retried
    fn should_retry(&self, error: &E) -> bool;
}

/// A predicate that always returns true (all errors are retryable)
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysRetry;

impl<E: ?Sized> RetryPredicate<E> for AlwaysRetry {
    fn should_retry(&self, _error: &E) -> bool {
        true
    }
}

/// A predicate that never retries (no errors are retryable)
#[derive(Debug, Clone, Copy)]
pub struct NeverRetry;

impl<E: ?Sized> RetryPredicate<E> for NeverRetry {
    fn should_retry(&self, _error: &E) -> bool {
        false
    }
}

/// A predicate that uses a closure to determine retryability
pub struct ClosurePredicate<F> {
    predicate: F,
}

impl<F> ClosurePredicate<F> {
    /// Create a new closure-based predicate
    pub fn new(predicate: F) -> Self {
        Self { predicate }
    }
}

impl<E, F> RetryPredicate<E> for ClosurePredicate<F>
where
    F: Fn(&E) -> bool + Send + Sync,
{
    fn should_retry(&self, error: &E) -> bool {
        (self.predicate)(error)
    }
}

/// Retries only errors whose message contains one of the given patterns
///
/// Matching is case-insensitive. An empty pattern list retries everything.
#[derive(Debug, Clone)]
pub struct MessagePredicate {
    retryable_patterns: Vec<String>,
}

impl MessagePredicate {
    /// Create a new message predicate with the given patterns
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            retryable_patterns: patterns
                .into_iter()
                .map(|p| p.into().to_lowercase())
                .collect(),
        }
    }

    pub fn patterns(&self) -> &[String] {
        &self.retryable_patterns
    }
}

impl<E: Display + ?Sized> RetryPredicate<E> for MessagePredicate {
    fn should_retry(&self, error: &E) -> bool {
        if self.retryable_patterns.is_empty() {
            return true;
        }
        let error_msg = error.to_string().to_lowercase();
        self.retryable_patterns
            .iter()
            .any(|pattern| error_msg.contains(pattern.as_str()))
    }
}
