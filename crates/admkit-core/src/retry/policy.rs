//! Retry policy types

use serde::{Deserialize, Serialize};

/// Retry policy for an operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RetryPolicy {
    /// Total number of executions, including the first; values below 1 mean 1
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay strategy between attempts
    #[serde(default)]
    pub strategy: RetryStrategy,

    /// Backoff multiplier for exponential strategies
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_delay")]
    pub initial_delay_ms: u64,

    /// Maximum delay in milliseconds, before jitter
    #[serde(default = "default_max_delay")]
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            strategy: RetryStrategy::default(),
            backoff_multiplier: default_backoff_multiplier(),
            initial_delay_ms: default_initial_delay(),
            max_delay_ms: default_max_delay(),
        }
    }
}

impl RetryPolicy {
    /// `max_attempts` executions with no delay between them
    pub fn attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            strategy: RetryStrategy::None,
            ..Self::default()
        }
    }

    /// `max_attempts` executions separated by a constant delay
    pub fn fixed(max_attempts: u32, delay_ms: u64) -> Self {
        Self {
            max_attempts,
            strategy: RetryStrategy::FixedDelay,
            initial_delay_ms: delay_ms,
            max_delay_ms: delay_ms.max(default_max_delay()),
            ..Self::default()
        }
    }

    /// Number of executions actually performed: never fewer than one
    pub fn effective_attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

fn default_max_attempts() -> u32 {
    3
}
fn default_backoff_multiplier() -> f64 {
    2.0
}
fn default_initial_delay() -> u64 {
    1000
}
fn default_max_delay() -> u64 {
    30000
}

/// Delay strategy between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum RetryStrategy {
    /// Retry immediately (default)
    #[default]
    None,

    /// Fixed delay between retries
    FixedDelay,

    /// Exponential backoff
    ExponentialBackoff,

    /// Linear backoff
    LinearBackoff,
}
