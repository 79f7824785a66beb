//! Defaults for the settings the command line does not supply.

use anyhow::{Context, Result};
use std::path::PathBuf;

pub const DB_FILE_NAME: &str = "budgetly.db";
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Database file in the platform data directory, created if missing.
pub fn default_db_path() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "budgetly", "Budgetly")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
    Ok(data_dir.join(DB_FILE_NAME))
}

/// Owner id for a local user: the OS account name.
pub fn default_owner() -> Result<String> {
    ["USER", "USERNAME"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .map(|name| name.trim().to_string())
        .find(|name| !name.is_empty())
        .ok_or_else(|| anyhow::anyhow!("Could not determine the owner; pass --owner or set BUDGETLY_OWNER"))
}
