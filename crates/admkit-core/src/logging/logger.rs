use fs4::fs_std::FileExt;
use serde_json::{Map, Value};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::config::{ConfigStore, ConfigValue, DEFAULT_COMPONENT, DEFAULT_LOG_FILE};
use crate::error::{Error, Result};
use crate::lock;

use super::entry::LogEntry;
use super::level::LogLevel;
use super::terminal;

/// What [`Logger::write`] does when the log file cannot be appended to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFailurePolicy {
    /// Warn once per failed write and fall back to console-only output.
    /// The entry is printed even when console output is suppressed.
    #[default]
    Degrade,
    /// Return [`Error::LogIo`] to the caller
    Fail,
}

/// Per-call options for [`Logger::write`]
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    /// Component tag overriding the logger's own
    pub component: Option<String>,
    /// Skip the console echo for this entry
    pub no_console: bool,
    /// Structured context stored alongside the message
    pub context: Map<String, Value>,
}

impl WriteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn component(mut self, component: impl Into<String>) -> Self {
        self.component = Some(component.into());
        self
    }

    pub fn no_console(mut self) -> Self {
        self.no_console = true;
        self
    }

    pub fn context(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }
}

/// Handle to an append-only log file
///
/// Cheap to clone; clones share nothing but the path, and appends to the same
/// path are serialized both within the process and through an exclusive file
/// lock.
#[derive(Debug, Clone)]
pub struct Logger {
    path: PathBuf,
    component: String,
    console: bool,
    failure_policy: LogFailurePolicy,
}

impl Logger {
    /// Open (creating if needed) the log file at `path`
    ///
    /// Parent directories are created. An empty component falls back to
    /// `"admkit"`.
    pub fn init(path: impl Into<PathBuf>, component: impl Into<String>) -> Result<Self> {
        let path = path.into();
        let component = component.into();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| Error::log_io(parent, e))?;
            }
        }
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| Error::log_io(&path, e))?;

        tracing::debug!(path = %path.display(), component = %component, "logger initialized");

        Ok(Self {
            path,
            component: if component.trim().is_empty() {
                DEFAULT_COMPONENT.to_string()
            } else {
                component
            },
            console: true,
            failure_policy: LogFailurePolicy::default(),
        })
    }

    /// Build a logger from the `log_file`, `component` and `console_output`
    /// keys of a configuration store
    ///
    /// A relative `log_file` is resolved against the config file's directory.
    pub fn from_config(store: &ConfigStore) -> Result<Self> {
        let log_file = store.get("log_file", DEFAULT_LOG_FILE);
        let log_file = PathBuf::from(log_file.as_str().unwrap_or(DEFAULT_LOG_FILE));
        let log_path = if log_file.is_absolute() {
            log_file
        } else {
            store
                .path()
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .join(log_file)
        };

        let component = match store.get("component", DEFAULT_COMPONENT) {
            ConfigValue::String(s) => s,
            other => other.to_string(),
        };
        let console = store.get("console_output", true).as_bool().unwrap_or(true);

        Ok(Self::init(log_path, component)?.with_console(console))
    }

    /// Enable or disable the console echo for every write
    pub fn with_console(mut self, console: bool) -> Self {
        self.console = console;
        self
    }

    /// Choose how file-append failures are handled
    pub fn with_failure_policy(mut self, policy: LogFailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    pub fn failure_policy(&self) -> LogFailurePolicy {
        self.failure_policy
    }

    /// Append an entry to the log file and echo it to the console
    ///
    /// Returns the entry that was written.
    pub fn write(
        &self,
        level: LogLevel,
        message: impl Into<String>,
        options: WriteOptions,
    ) -> Result<LogEntry> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(Error::EmptyLogMessage);
        }

        let component = options
            .component
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| self.component.clone());
        let entry = LogEntry::new(level, component, message).with_context(options.context);

        match self.append(&entry) {
            Ok(()) => {
                if self.console && !options.no_console {
                    terminal::emit(&entry);
                }
            }
            Err(e) => match self.failure_policy {
                LogFailurePolicy::Fail => return Err(e),
                LogFailurePolicy::Degrade => {
                    tracing::warn!(error = %e, "log file unavailable, writing to console only");
                    terminal::notice(&format!("{} (console only)", e));
                    terminal::emit(&entry);
                }
            },
        }

        Ok(entry)
    }

    pub fn debug(&self, message: impl Into<String>) -> Result<LogEntry> {
        self.write(LogLevel::Debug, message, WriteOptions::default())
    }

    pub fn info(&self, message: impl Into<String>) -> Result<LogEntry> {
        self.write(LogLevel::Info, message, WriteOptions::default())
    }

    pub fn warning(&self, message: impl Into<String>) -> Result<LogEntry> {
        self.write(LogLevel::Warning, message, WriteOptions::default())
    }

    pub fn error(&self, message: impl Into<String>) -> Result<LogEntry> {
        self.write(LogLevel::Error, message, WriteOptions::default())
    }

    pub fn critical(&self, message: impl Into<String>) -> Result<LogEntry> {
        self.write(LogLevel::Critical, message, WriteOptions::default())
    }

    /// Read entries back in write order
    ///
    /// With `limit`, only the most recent `limit` entries are returned. Lines
    /// that do not parse (hand edits, truncated writes) are skipped.
    pub fn read_entries(&self, limit: Option<usize>) -> Result<Vec<LogEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path).map_err(|e| Error::log_io(&self.path, e))?;
        let reader = BufReader::new(file);

        let mut entries = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| Error::log_io(&self.path, e))?;
            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str::<LogEntry>(&line) {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    tracing::warn!(line = index + 1, error = %e, "skipping malformed log line");
                }
            }
        }

        if let Some(limit) = limit {
            if entries.len() > limit {
                entries = entries.split_off(entries.len() - limit);
            }
        }

        Ok(entries)
    }

    /// Append one JSON line under the path mutex and an exclusive file lock
    fn append(&self, entry: &LogEntry) -> Result<()> {
        let json_line = entry.to_json_line()?;

        let mutex = lock::path_mutex(&self.path);
        let _guard = lock::acquire(&mutex);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| Error::log_io(&self.path, e))?;

        // Released when `file` is dropped
        file.lock_exclusive()
            .map_err(|e| Error::log_io(&self.path, e))?;

        writeln!(file, "{}", json_line).map_err(|e| Error::log_io(&self.path, e))?;
        file.sync_all().map_err(|e| Error::log_io(&self.path, e))?;

        Ok(())
    }
}
