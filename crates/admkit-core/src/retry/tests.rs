//! Integration tests for the retry module
//!
//! These tests drive `invoke_with_error_handling` end to end, including the
//! log entries it leaves behind.

use std::cell::Cell;
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tempfile::TempDir;

use crate::logging::{LogLevel, Logger};
use crate::retry::error::RetryError;
use crate::retry::executor::{invoke_with_error_handling, RetryExecutorBuilder};
use crate::retry::observer::StatsObserver;
use crate::retry::policy::{RetryPolicy, RetryStrategy};
use crate::retry::strategies::{calculate_delay, MessagePredicate, NeverRetry};

fn quiet_logger() -> (Logger, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let logger = Logger::init(temp_dir.path().join("retry.log"), "retry")
        .unwrap()
        .with_console(false);
    (logger, temp_dir)
}

/// Create a test policy with short delays
fn quick_policy(max_attempts: u32, strategy: RetryStrategy) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        strategy,
        backoff_multiplier: 2.0,
        initial_delay_ms: 1, // Very short for tests
        max_delay_ms: 10,
    }
}

// ============================================================================
// invoke_with_error_handling
// ============================================================================

#[test]
fn test_simple_sum_runs_once() {
    let (logger, _temp) = quiet_logger();
    let calls = Cell::new(0);

    let result = invoke_with_error_handling(&logger, "SimpleSum", 1, false, || {
        calls.set(calls.get() + 1);
        Ok::<_, io::Error>(2 + 2)
    });

    assert_eq!(result.unwrap(), Some(4));
    assert_eq!(calls.get(), 1);
    assert!(logger.read_entries(None).unwrap().is_empty());
}

#[test]
fn test_failure_raises_after_one_attempt() {
    let (logger, _temp) = quiet_logger();
    let calls = Cell::new(0);

    let result: Result<Option<()>, RetryError<String>> =
        invoke_with_error_handling(&logger, "Fail", 1, false, || {
            calls.set(calls.get() + 1);
            Err("boom".to_string())
        });

    let err = result.unwrap_err();
    assert_eq!(calls.get(), 1);
    assert!(err.is_exhausted());
    assert_eq!(err.attempts(), 1);
    assert_eq!(err.operation(), "Fail");
    assert_eq!(err.source_ref(), "boom");
    assert!(err.to_string().contains("boom"));
}

#[test]
fn test_continue_on_error_returns_sentinel_after_all_attempts() {
    let (logger, _temp) = quiet_logger();
    let calls = Cell::new(0);

    let result: Result<Option<i32>, RetryError<String>> =
        invoke_with_error_handling(&logger, "Fail", 3, true, || {
            calls.set(calls.get() + 1);
            Err("boom".to_string())
        });

    assert_eq!(result.unwrap(), None);
    assert_eq!(calls.get(), 3);
}

#[test]
fn test_failures_are_logged_as_warning_then_error() {
    let (logger, _temp) = quiet_logger();

    let _: Result<Option<()>, RetryError<String>> =
        invoke_with_error_handling(&logger, "Upload", 2, false, || Err("refused".to_string()));

    let entries = logger.read_entries(None).unwrap();
    let levels: Vec<LogLevel> = entries.iter().map(|e| e.level).collect();
    assert_eq!(
        levels,
        vec![LogLevel::Warning, LogLevel::Warning, LogLevel::Error]
    );

    assert!(entries[0].message.contains("Upload"));
    assert!(entries[0].message.contains("attempt 1"));
    assert!(entries[1].message.contains("attempt 2"));
    assert!(entries.iter().all(|e| e.message.contains("refused")));
    assert!(entries[2].message.contains("giving up"));
}

#[test]
fn test_success_after_retry_is_logged() {
    let (logger, _temp) = quiet_logger();
    let calls = Cell::new(0);

    let result = invoke_with_error_handling(&logger, "Mount", 3, false, || {
        calls.set(calls.get() + 1);
        if calls.get() < 3 {
            Err(io::Error::other("device busy"))
        } else {
            Ok("mounted")
        }
    });

    assert_eq!(result.unwrap(), Some("mounted"));
    let levels: Vec<LogLevel> = logger
        .read_entries(None)
        .unwrap()
        .iter()
        .map(|e| e.level)
        .collect();
    assert_eq!(
        levels,
        vec![LogLevel::Warning, LogLevel::Warning, LogLevel::Info]
    );
}

#[test]
fn test_zero_retries_means_one_attempt() {
    let (logger, _temp) = quiet_logger();
    let calls = Cell::new(0);

    let result: Result<Option<()>, RetryError<String>> =
        invoke_with_error_handling(&logger, "Once", 0, true, || {
            calls.set(calls.get() + 1);
            Err("nope".to_string())
        });

    assert_eq!(result.unwrap(), None);
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_result_passes_through_unchanged() {
    let (logger, _temp) = quiet_logger();
    let payload = vec![Some(1), None, Some(3)];

    let result = invoke_with_error_handling(&logger, "Payload", 2, true, || {
        Ok::<_, io::Error>(payload.clone())
    });

    assert_eq!(result.unwrap(), Some(payload));
}

#[test]
fn test_log_failure_does_not_break_retry() {
    let (logger, _temp) = quiet_logger();
    let logger = logger.with_failure_policy(crate::LogFailurePolicy::Fail);
    std::fs::remove_file(logger.path()).unwrap();
    std::fs::create_dir(logger.path()).unwrap();

    let calls = Cell::new(0);
    let result: Result<Option<()>, RetryError<String>> =
        invoke_with_error_handling(&logger, "NoLog", 2, true, || {
            calls.set(calls.get() + 1);
            Err("fails".to_string())
        });

    assert_eq!(result.unwrap(), None);
    assert_eq!(calls.get(), 2);
}

// ============================================================================
// Executor with predicates and delays
// ============================================================================

#[test]
fn test_message_predicate_stops_on_unmatched_error() {
    let observer = Arc::new(StatsObserver::new());
    let calls = Cell::new(0);

    let result: Result<(), RetryError<io::Error>> = RetryExecutorBuilder::new("fetch")
        .with_policy(quick_policy(5, RetryStrategy::None))
        .with_predicate(MessagePredicate::new(["temporarily unavailable"]))
        .with_observer(observer.clone())
        .build()
        .execute(|| {
            calls.set(calls.get() + 1);
            if calls.get() == 1 {
                Err(io::Error::other("Resource temporarily unavailable"))
            } else {
                Err(io::Error::other("permission denied"))
            }
        });

    let err = result.unwrap_err();
    assert!(err.is_non_retryable());
    assert_eq!(err.attempts(), 2);
    assert_eq!(observer.failures(), 1);
    assert_eq!(observer.cancellations(), 1);
}

#[test]
fn test_never_retry_with_continue_on_error() {
    let (logger, _temp) = quiet_logger();

    let result: Result<Option<()>, RetryError<io::Error>> = RetryExecutorBuilder::new("probe")
        .with_policy(quick_policy(4, RetryStrategy::None))
        .with_predicate(NeverRetry)
        .with_observer(crate::retry::LogObserver::new(logger.clone()))
        .continue_on_error(true)
        .build()
        .execute_or_continue(|| Err(io::Error::other("bad input")));

    assert_eq!(result.unwrap(), None);
    let entries = logger.read_entries(None).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].level, LogLevel::Error);
    assert!(entries[0].message.contains("non-retryable"));
}

#[test]
fn test_fixed_delay_is_applied_between_attempts() {
    let policy = RetryPolicy {
        max_attempts: 3,
        strategy: RetryStrategy::FixedDelay,
        backoff_multiplier: 2.0,
        initial_delay_ms: 20,
        max_delay_ms: 20,
    };

    let start = Instant::now();
    let result: Result<(), RetryError<io::Error>> = RetryExecutorBuilder::new("slow")
        .with_policy(policy)
        .with_jitter(false)
        .build()
        .execute(|| Err(io::Error::other("x")));

    assert!(result.is_err());
    // Two gaps between three attempts, none after the last
    assert!(start.elapsed() >= Duration::from_millis(40));
}

#[test]
fn test_exponential_delays_are_capped() {
    let policy = RetryPolicy {
        max_attempts: 10,
        strategy: RetryStrategy::ExponentialBackoff,
        backoff_multiplier: 2.0,
        initial_delay_ms: 100,
        max_delay_ms: 1000,
    };

    let delays: Vec<u128> = (1..=6)
        .map(|attempt| calculate_delay(&policy, attempt, false).as_millis())
        .collect();
    assert_eq!(delays, vec![100, 200, 400, 800, 1000, 1000]);

    for attempt in 1..=10 {
        assert!(calculate_delay(&policy, attempt, true) <= Duration::from_millis(1250));
    }
}

#[test]
fn test_quick_policy_roundtrip_through_executor() {
    let observer = Arc::new(StatsObserver::new());
    let calls = Cell::new(0);

    let result: Result<u32, RetryError<io::Error>> = RetryExecutorBuilder::new("linear")
        .with_policy(quick_policy(4, RetryStrategy::LinearBackoff))
        .with_observer(observer.clone())
        .build()
        .execute(|| {
            calls.set(calls.get() + 1);
            if calls.get() < 4 {
                Err(io::Error::other("again"))
            } else {
                Ok(calls.get())
            }
        });

    assert_eq!(result.unwrap(), 4);
    assert_eq!(observer.failures(), 3);
    assert_eq!(observer.exhaustions(), 0);
}
