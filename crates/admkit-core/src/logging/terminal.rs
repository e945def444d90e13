//! Human-readable console rendering of log entries

use console::style;
use std::io::{self, Write};

use super::entry::LogEntry;
use super::level::LogLevel;

/// Format an entry for the terminal: `HH:MM:SS LEVEL    [component] message`
pub(crate) fn render(entry: &LogEntry) -> String {
    let timestamp = entry.timestamp.format("%H:%M:%S");
    let level = format!("{:<8}", entry.level.as_str());
    let level = match entry.level {
        LogLevel::Debug => style(level).dim(),
        LogLevel::Info => style(level).blue(),
        LogLevel::Warning => style(level).yellow(),
        LogLevel::Error => style(level).red(),
        LogLevel::Critical => style(level).red().bold(),
    };

    let mut line = format!(
        "{} {} {} {}",
        style(timestamp).dim(),
        level,
        style(format!("[{}]", entry.component)).cyan(),
        entry.message
    );

    if let Some(context) = &entry.context {
        let pairs: Vec<String> = context
            .iter()
            .map(|(k, v)| match v {
                serde_json::Value::String(s) => format!("{}={}", k, s),
                other => format!("{}={}", k, other),
            })
            .collect();
        line.push(' ');
        line.push_str(&style(pairs.join(" ")).dim().to_string());
    }

    line
}

/// Print an entry, Warning and above to stderr; write failures are ignored
pub(crate) fn emit(entry: &LogEntry) {
    let line = render(entry);
    let _ = if entry.level.is_diagnostic() {
        writeln!(io::stderr(), "{}", line)
    } else {
        writeln!(io::stdout(), "{}", line)
    };
}

/// Print a notice about the logger itself (e.g. a degraded file sink)
pub(crate) fn notice(message: &str) {
    let _ = writeln!(io::stderr(), "{} {}", style("⚠").yellow().bold(), message);
}
