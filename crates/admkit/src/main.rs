//! admkit CLI - helpers for administrative shell scripts
//!
//! This is the main entry point for the admkit command-line interface.

mod cli;
mod commands;
mod output;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    let store = commands::open_store(cli.config.as_deref())?;

    match cli.command {
        Commands::Config(cmd) => commands::config::run(cmd, &store),
        Commands::Log(cmd) => commands::log::run(cmd, &store),
        Commands::Exec(args) => commands::exec::run(args, &store),
    }
}

/// Initialize tracing with appropriate verbosity
///
/// Diagnostics go to stderr so stdout stays usable in pipelines.
fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
