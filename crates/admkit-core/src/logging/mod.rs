//! Leveled, append-only file logging
//!
//! A [`Logger`] is an explicit handle: it carries its log file path, its
//! component tag and its console preference. There is no process-wide
//! logging state; independent loggers can coexist in one process.
//!
//! Each [`Logger::write`] appends one JSON line to the log file and, unless
//! suppressed, echoes a colored line to the terminal.

mod entry;
mod level;
mod logger;
mod terminal;

pub use entry::LogEntry;
pub use level::LogLevel;
pub use logger::{LogFailurePolicy, Logger, WriteOptions};
