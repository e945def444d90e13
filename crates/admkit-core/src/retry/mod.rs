//! Retry execution engine with policy-based configuration
//!
//! Runs a fallible unit of work up to a bounded number of attempts, reporting
//! every attempt to a [`RetryObserver`]. The executor never inspects the
//! work's result: success values pass through unchanged.
//!
//! # Features
//!
//! - `max_attempts` counts total executions, so `1` means no retry
//! - Optional bounded backoff: None, Fixed, Exponential, Linear
//! - Predicates to stop early on errors that cannot succeed on retry
//! - `continue_on_error` turns final failures into a `None` sentinel
//! - [`LogObserver`] records attempts through a [`Logger`](crate::Logger)
//!
//! # Example
//!
//! ```rust,no_run
//! use admkit_core::retry::invoke_with_error_handling;
//! use admkit_core::Logger;
//!
//! fn example() -> anyhow::Result<()> {
//!     let logger = Logger::init("/tmp/admkit-example.log", "example")?;
//!
//!     let sum = invoke_with_error_handling(&logger, "SimpleSum", 1, false, || {
//!         Ok::<_, std::io::Error>(2 + 2)
//!     })?;
//!     assert_eq!(sum, Some(4));
//!     Ok(())
//! }
//! ```

mod error;
mod executor;
mod observer;
mod policy;
mod strategies;

pub use error::RetryError;
pub use executor::{invoke_with_error_handling, RetryExecutor, RetryExecutorBuilder};
pub use observer::{LogObserver, NoOpObserver, RetryObserver, StatsObserver};
pub use policy::{RetryPolicy, RetryStrategy};
pub use strategies::{
    calculate_delay, AlwaysRetry, ClosurePredicate, MessagePredicate, NeverRetry, RetryPredicate,
};

#[cfg(test)]
mod tests;
