//! Log command

use admkit_core::{ConfigStore, Logger, WriteOptions};
use anyhow::{anyhow, Context, Result};
use serde_json::Value;

use crate::cli::{LogCommands, LogTailArgs, LogWriteArgs};
use crate::output;

pub fn run(cmd: LogCommands, store: &ConfigStore) -> Result<()> {
    let logger = Logger::from_config(store).context("Failed to open log file")?;

    match cmd {
        LogCommands::Write(args) => write(args, &logger),
        LogCommands::Tail(args) => tail(args, &logger),
    }
}

fn write(args: LogWriteArgs, logger: &Logger) -> Result<()> {
    let mut options = WriteOptions::new();
    if let Some(component) = args.component {
        options = options.component(component);
    }
    if args.no_console {
        options = options.no_console();
    }
    for pair in &args.context {
        let (key, value) = parse_context_pair(pair)?;
        options = options.context(key, value);
    }

    logger.write(args.level, args.message, options)?;
    Ok(())
}

fn tail(args: LogTailArgs, logger: &Logger) -> Result<()> {
    let entries = logger
        .read_entries(Some(args.lines))
        .context("Failed to read log file")?;

    if entries.is_empty() && !args.json {
        output::info(&format!("No entries in {}", logger.path().display()));
        return Ok(());
    }

    for entry in &entries {
        if args.json {
            println!("{}", entry.to_json_line()?);
        } else {
            println!("{}", entry.to_console_line());
        }
    }
    Ok(())
}

/// Split `key=value`; the value is read as JSON when it parses, else kept as text
fn parse_context_pair(pair: &str) -> Result<(String, Value)> {
    let (key, raw) = pair
        .split_once('=')
        .ok_or_else(|| anyhow!("Invalid context '{}': expected KEY=VALUE", pair))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(anyhow!("Invalid context '{}': empty key", pair));
    }

    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}
