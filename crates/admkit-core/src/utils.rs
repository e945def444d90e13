//! Shared utility functions for admkit crates

use anyhow::anyhow;
use std::path::PathBuf;

/// Name of the per-user state directory under `$HOME`
pub const STATE_DIR_NAME: &str = ".admkit";

/// Get the user's home directory
///
/// Prefers the HOME environment variable over dirs::home_dir() so that
/// scripts overriding HOME (sandboxes, CI runners) see a consistent location.
pub fn get_home_dir() -> anyhow::Result<PathBuf> {
    if let Ok(home) = std::env::var("HOME") {
        if !home.is_empty() {
            return Ok(PathBuf::from(home));
        }
    }

    dirs::home_dir().ok_or_else(|| anyhow!("Could not determine home directory"))
}

/// Get the admkit state directory (~/.admkit)
pub fn get_state_dir() -> anyhow::Result<PathBuf> {
    Ok(get_home_dir()?.join(STATE_DIR_NAME))
}
