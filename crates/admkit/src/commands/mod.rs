//! CLI command implementations

pub mod config;
pub mod exec;
pub mod log;

use admkit_core::ConfigStore;
use anyhow::{Context, Result};
use camino::Utf8Path;

/// Open the config store named by `--config`, or the default one
pub fn open_store(path: Option<&Utf8Path>) -> Result<ConfigStore> {
    match path {
        Some(path) => Ok(ConfigStore::new(path.as_std_path())),
        None => ConfigStore::load_default().context("Failed to locate the default config file"),
    }
}
