//! Error types for admkit-core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using admkit-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for admkit
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file could not be read or written
    #[error("Configuration I/O error at {}: {source}", .path.display())]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file exists but does not hold a valid mapping
    #[error("Invalid configuration file {}: {source}", .path.display())]
    ConfigFormat {
        path: PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },

    /// Log file could not be created or appended to
    #[error("Log I/O error at {}: {source}", .path.display())]
    LogIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Log entry could not be serialized
    #[error("Failed to serialize log entry: {0}")]
    LogSerialize(#[from] serde_json::Error),

    /// Log entries must carry a message
    #[error("Log message must not be empty")]
    EmptyLogMessage,

    /// Unrecognized log level name
    #[error("Unknown log level: {level}. Valid levels: debug, info, warning, error, critical")]
    InvalidLevel { level: String },
}

impl Error {
    /// Create a config I/O error
    pub fn config_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ConfigIo {
            path: path.into(),
            source,
        }
    }

    /// Create a config format error
    pub fn config_format(path: impl Into<PathBuf>, source: serde_yaml_ng::Error) -> Self {
        Self::ConfigFormat {
            path: path.into(),
            source,
        }
    }

    /// Create a log I/O error
    pub fn log_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::LogIo {
            path: path.into(),
            source,
        }
    }

    /// Create an invalid level error
    pub fn invalid_level(level: impl Into<String>) -> Self {
        Self::InvalidLevel {
            level: level.into(),
        }
    }

    /// True for errors raised by the configuration store
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::ConfigIo { .. } | Self::ConfigFormat { .. })
    }

    /// True for errors raised by the logger's file sink
    pub fn is_log_error(&self) -> bool {
        matches!(self, Self::LogIo { .. } | Self::LogSerialize(_))
    }
}
