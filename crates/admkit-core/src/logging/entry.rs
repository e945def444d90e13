use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::level::LogLevel;

/// One record in the log file
///
/// Serialized as a single JSON line. `context` is omitted when empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub component: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Map<String, Value>>,
}

impl LogEntry {
    /// Create an entry stamped with the current time
    pub fn new(level: LogLevel, component: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            component: component.into(),
            message: message.into(),
            context: None,
        }
    }

    /// Attach structured context; an empty map is dropped
    pub fn with_context(mut self, context: Map<String, Value>) -> Self {
        self.context = if context.is_empty() {
            None
        } else {
            Some(context)
        };
        self
    }

    /// Human-readable, color-coded line as echoed by the logger
    pub fn to_console_line(&self) -> String {
        super::terminal::render(self)
    }

    /// Serialize to the on-disk line format (no trailing newline)
    pub fn to_json_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
