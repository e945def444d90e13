//! Exec command: run an external program through the retry executor

use admkit_core::retry::{LogObserver, MessagePredicate, RetryExecutorBuilder, RetryPolicy};
use admkit_core::{ConfigStore, Logger};
use anyhow::{Context, Result};
use std::path::Path;

use crate::cli::ExecArgs;
use crate::output;

pub fn run(args: ExecArgs, store: &ConfigStore) -> Result<()> {
    let (program, program_args) = args
        .command
        .split_first()
        .context("No command given")?;

    let operation = args
        .operation
        .clone()
        .unwrap_or_else(|| operation_name(program));
    let policy = resolve_policy(&args, store);

    let logger = Logger::from_config(store).context("Failed to open log file")?;

    tracing::debug!(
        operation = %operation,
        max_attempts = policy.effective_attempts(),
        delay_ms = policy.initial_delay_ms,
        "running command"
    );

    let executor = RetryExecutorBuilder::new(operation.clone())
        .with_policy(policy)
        .with_predicate(MessagePredicate::new(args.retry_on.iter().cloned()))
        .with_observer(LogObserver::new(logger))
        .continue_on_error(args.continue_on_error)
        .build();

    let outcome = executor.execute_or_continue(|| duct::cmd(program.as_str(), program_args).run())?;

    match outcome {
        Some(_) => output::success(&format!("{} completed", operation)),
        None => output::warning(&format!("{} failed; continuing", operation)),
    }
    Ok(())
}

/// Attempts and delay from flags, falling back to `max_retries` and
/// `retry_delay_ms` in the config
fn resolve_policy(args: &ExecArgs, store: &ConfigStore) -> RetryPolicy {
    let attempts = args.retries.unwrap_or_else(|| {
        store
            .get("max_retries", 1)
            .as_i64()
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(1)
    });

    let delay_ms = args.delay_ms.unwrap_or_else(|| {
        store
            .get("retry_delay_ms", 0)
            .as_i64()
            .and_then(|n| u64::try_from(n).ok())
            .unwrap_or(0)
    });

    if delay_ms > 0 {
        RetryPolicy::fixed(attempts, delay_ms)
    } else {
        RetryPolicy::attempts(attempts)
    }
}

fn operation_name(program: &str) -> String {
    Path::new(program)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| program.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use admkit_core::retry::RetryStrategy;
    use tempfile::TempDir;

    fn exec_args(retries: Option<u32>, delay_ms: Option<u64>) -> ExecArgs {
        ExecArgs {
            operation: None,
            retries,
            delay_ms,
            continue_on_error: false,
            retry_on: Vec::new(),
            command: vec!["true".to_string()],
        }
    }

    #[test]
    fn test_operation_name_uses_file_name() {
        assert_eq!(operation_name("/usr/bin/rsync"), "rsync");
        assert_eq!(operation_name("backup.sh"), "backup.sh");
    }

    #[test]
    fn test_policy_from_config() {
        let temp_dir = TempDir::new().unwrap();
        let store = ConfigStore::new(temp_dir.path().join("config.yaml"));
        store.set("max_retries", 4).unwrap();
        store.set("retry_delay_ms", 250).unwrap();

        let policy = resolve_policy(&exec_args(None, None), &store);
        assert_eq!(policy.max_attempts, 4);
        assert_eq!(policy.strategy, RetryStrategy::FixedDelay);
        assert_eq!(policy.initial_delay_ms, 250);
    }

    #[test]
    fn test_flags_override_config() {
        let temp_dir = TempDir::new().unwrap();
        let store = ConfigStore::new(temp_dir.path().join("config.yaml"));
        store.set("max_retries", 4).unwrap();

        let policy = resolve_policy(&exec_args(Some(2), Some(0)), &store);
        assert_eq!(policy.max_attempts, 2);
        assert_eq!(policy.strategy, RetryStrategy::None);
    }

    #[test]
    fn test_missing_config_means_single_attempt() {
        let temp_dir = TempDir::new().unwrap();
        let store = ConfigStore::new(temp_dir.path().join("absent.yaml"));

        let policy = resolve_policy(&exec_args(None, None), &store);
        assert_eq!(policy.effective_attempts(), 1);
    }

    #[test]
    fn test_negative_config_values_are_ignored() {
        let temp_dir = TempDir::new().unwrap();
        let store = ConfigStore::new(temp_dir.path().join("config.yaml"));
        store.set("max_retries", -2).unwrap();
        store.set("retry_delay_ms", -5).unwrap();

        let policy = resolve_policy(&exec_args(None, None), &store);
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.strategy, RetryStrategy::None);
    }
}
