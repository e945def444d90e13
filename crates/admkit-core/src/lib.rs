//! # admkit-core
//!
//! Core library for the admkit CLI providing:
//! - A file-backed key/value configuration store
//! - An append-only, leveled file logger with console echo
//! - Retry execution engine with policy-based configuration

pub mod config;
pub mod error;
mod lock;
pub mod logging;
pub mod retry;
pub mod utils;

pub use config::{default_configuration, ConfigMap, ConfigStore, ConfigValue};
pub use error::{Error, Result};
pub use logging::{LogEntry, LogFailurePolicy, LogLevel, Logger, WriteOptions};
pub use retry::{invoke_with_error_handling, RetryError, RetryPolicy, RetryStrategy};
pub use utils::get_home_dir;
