//! Error types for the retry execution engine

use std::error::Error;
use std::fmt;
use std::time::Duration;

/// Failure of a retried unit of work
///
/// Generic over `E`, the error type returned by the work itself. Both variants
/// keep the original error and annotate it with the operation name and the
/// number of attempts made.
#[derive(Debug)]
pub enum RetryError<E> {
    /// Every allowed attempt failed
    Exhausted {
        /// Name of the operation being retried
        operation: String,
        /// Number of attempts made before giving up
        attempts: u32,
        /// The error from the final attempt
        source: E,
        /// Total duration spent across all attempts
        total_duration: Duration,
    },

    /// A `RetryPredicate` rejected the error, so retrying stopped early
    NonRetryable {
        /// Name of the operation being retried
        operation: String,
        /// Attempt on which the error occurred
        attempt: u32,
        /// The rejected error
        source: E,
    },
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryError::Exhausted {
                operation,
                attempts,
                source,
                total_duration,
            } => {
                write!(
                    f,
                    "operation '{}' failed after {} attempt{} over {:.2}s: {}",
                    operation,
                    attempts,
                    if *attempts == 1 { "" } else { "s" },
                    total_duration.as_secs_f64(),
                    source
                )
            }
            RetryError::NonRetryable {
                operation,
                attempt,
                source,
            } => {
                write!(
                    f,
                    "operation '{}' hit a non-retryable error on attempt {}: {}",
                    operation, attempt, source
                )
            }
        }
    }
}

impl<E: Error + 'static> Error for RetryError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RetryError::Exhausted { source, .. } => Some(source),
            RetryError::NonRetryable { source, .. } => Some(source),
        }
    }
}

impl<E> RetryError<E> {
    /// Create a new exhausted error
    pub fn exhausted(
        operation: impl Into<String>,
        attempts: u32,
        source: E,
        total_duration: Duration,
    ) -> Self {
        RetryError::Exhausted {
            operation: operation.into(),
            attempts,
            source,
            total_duration,
        }
    }

    /// Create a new non-retryable error
    pub fn non_retryable(operation: impl Into<String>, attempt: u32, source: E) -> Self {
        RetryError::NonRetryable {
            operation: operation.into(),
            attempt,
            source,
        }
    }

    /// Name of the operation that failed
    pub fn operation(&self) -> &str {
        match self {
            RetryError::Exhausted { operation, .. } => operation,
            RetryError::NonRetryable { operation, .. } => operation,
        }
    }

    /// Get the number of attempts made
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::Exhausted { attempts, .. } => *attempts,
            RetryError::NonRetryable { attempt, .. } => *attempt,
        }
    }

    /// Check if this error indicates all retries were exhausted
    pub fn is_exhausted(&self) -> bool {
        matches!(self, RetryError::Exhausted { .. })
    }

    /// Check if this error is non-retryable
    pub fn is_non_retryable(&self) -> bool {
        matches!(self, RetryError::NonRetryable { .. })
    }

    /// Get the underlying error, consuming this error
    pub fn into_source(self) -> E {
        match self {
            RetryError::Exhausted { source, .. } => source,
            RetryError::NonRetryable { source, .. } => source,
        }
    }

    /// Get a reference to the underlying error
    pub fn source_ref(&self) -> &E {
        match self {
            RetryError::Exhausted { source, .. } => source,
            RetryError::NonRetryable { source, .. } => source,
        }
    }

    /// Map the error type using a closure
    pub fn map_err<F, E2>(self, f: F) -> RetryError<E2>
    where
        F: FnOnce(E) -> E2,
    {
        match self {
            RetryError::Exhausted {
                operation,
                attempts,
                source,
                total_duration,
            } => RetryError::Exhausted {
                operation,
                attempts,
                source: f(source),
                total_duration,
            },
            RetryError::NonRetryable {
                operation,
                attempt,
                source,
            } => RetryError::NonRetryable {
                operation,
                attempt,
                source: f(source),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_exhausted_error() {
        let err: RetryError<io::Error> = RetryError::exhausted(
            "sync",
            3,
            io::Error::new(io::ErrorKind::TimedOut, "timeout"),
            Duration::from_secs(5),
        );

        assert!(err.is_exhausted());
        assert!(!err.is_non_retryable());
        assert_eq!(err.attempts(), 3);
        assert_eq!(err.operation(), "sync");
    }

    #[test]
    fn test_non_retryable_error() {
        let err: RetryError<io::Error> = RetryError::non_retryable(
            "copy",
            2,
            io::Error::new(io::ErrorKind::NotFound, "not found"),
        );

        assert!(err.is_non_retryable());
        assert_eq!(err.attempts(), 2);
        assert!(err.to_string().contains("non-retryable"));
    }

    #[test]
    fn test_into_source() {
        let err: RetryError<String> =
            RetryError::exhausted("op", 3, "original error".to_string(), Duration::from_secs(1));

        assert_eq!(err.source_ref(), "original error");
        assert_eq!(err.into_source(), "original error".to_string());
    }

    #[test]
    fn test_map_err() {
        let err: RetryError<i32> = RetryError::exhausted("op", 3, 42, Duration::from_secs(1));

        let mapped = err.map_err(|n| format!("error code: {}", n));
        assert!(
            matches!(mapped, RetryError::Exhausted { source, .. } if source == "error code: 42")
        );
    }

    #[test]
    fn test_display_names_operation_and_attempts() {
        let err: RetryError<io::Error> = RetryError::exhausted(
            "Fail",
            1,
            io::Error::other("boom"),
            Duration::from_millis(3),
        );

        let display = err.to_string();
        assert!(display.contains("'Fail'"));
        assert!(display.contains("1 attempt "));
        assert!(display.contains("boom"));

        let err: RetryError<io::Error> =
            RetryError::exhausted("Fail", 3, io::Error::other("boom"), Duration::ZERO);
        assert!(err.to_string().contains("3 attempts"));
    }

    #[test]
    fn test_error_source_chain() {
        let err: RetryError<io::Error> =
            RetryError::exhausted("op", 2, io::Error::other("disk gone"), Duration::ZERO);
        let source = Error::source(&err).expect("source should be the work error");
        assert_eq!(source.to_string(), "disk gone");
    }
}
