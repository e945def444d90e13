//! CLI argument parsing with clap

use admkit_core::LogLevel;
use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

/// admkit - configuration, logging, and retries for admin scripts
#[derive(Parser, Debug)]
#[command(name = "admkit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only report errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the config file (default: ~/.admkit/config.yaml)
    #[arg(short, long, global = true, env = "ADMKIT_CONFIG")]
    pub config: Option<Utf8PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Write to and read from the log file
    #[command(subcommand)]
    Log(LogCommands),

    /// Run a command, retrying on failure
    Exec(ExecArgs),
}

// Config commands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Create the config file with default values if it does not exist
    Init(ConfigInitArgs),

    /// Print the value stored under a key
    Get(ConfigGetArgs),

    /// Store a value under a key
    Set(ConfigSetArgs),

    /// Remove a key
    Unset(ConfigUnsetArgs),

    /// Show the whole configuration
    Show(ConfigShowArgs),
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Output the resulting configuration as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ConfigGetArgs {
    /// Key to look up
    pub key: String,

    /// Value printed when the key is absent (parsed like `config set`)
    #[arg(short, long)]
    pub default: Option<String>,
}

#[derive(Args, Debug)]
pub struct ConfigSetArgs {
    /// Key to set
    pub key: String,

    /// Value: YAML scalar or flow collection (`true`, `3`, `[a, b]`, `{k: v}`),
    /// anything else is stored as a string
    pub value: String,
}

#[derive(Args, Debug)]
pub struct ConfigUnsetArgs {
    /// Key to remove
    pub key: String,
}

#[derive(Args, Debug)]
pub struct ConfigShowArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// Log commands
#[derive(Subcommand, Debug)]
pub enum LogCommands {
    /// Append an entry to the log file
    Write(LogWriteArgs),

    /// Show the most recent log entries
    Tail(LogTailArgs),
}

#[derive(Args, Debug)]
pub struct LogWriteArgs {
    /// Severity: debug, info, warning, error, critical
    pub level: LogLevel,

    /// Message text
    pub message: String,

    /// Component tag (default: the config's `component`)
    #[arg(long)]
    pub component: Option<String>,

    /// Do not echo the entry to the terminal
    #[arg(long)]
    pub no_console: bool,

    /// Structured context as key=value (repeatable)
    #[arg(long = "context", value_name = "KEY=VALUE")]
    pub context: Vec<String>,
}

#[derive(Args, Debug)]
pub struct LogTailArgs {
    /// Number of entries to show
    #[arg(short = 'n', long, default_value_t = 25)]
    pub lines: usize,

    /// Output raw JSON lines
    #[arg(long)]
    pub json: bool,
}

// Exec command
#[derive(Args, Debug)]
pub struct ExecArgs {
    /// Operation name used in log entries (default: the program name)
    #[arg(long)]
    pub operation: Option<String>,

    /// Total attempts (default: the config's `max_retries`)
    #[arg(short, long)]
    pub retries: Option<u32>,

    /// Fixed delay between attempts in milliseconds
    /// (default: the config's `retry_delay_ms`)
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Exit successfully even if every attempt fails
    #[arg(long)]
    pub continue_on_error: bool,

    /// Only retry failures whose message contains this text (repeatable)
    #[arg(long, value_name = "PATTERN")]
    pub retry_on: Vec<String>,

    /// Command and arguments to run
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}
