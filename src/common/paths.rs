use anyhow::{Context, Result};
use std::path::PathBuf;

/// Centralized path management for mixsplit

/// Get the mixsplit config directory
pub fn mixsplit_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .context("Unable to determine user config directory")?
        .join("mixsplit");

    std::fs::create_dir_all(&config_dir)
        .with_context(|| format!("creating config directory at {}", config_dir.display()))?;

    Ok(config_dir)
}

/// Get the directory downloaded source audio is cached in
pub fn mixsplit_download_dir() -> Result<PathBuf> {
    let cache_dir = dirs::cache_dir()
        .context("Unable to resolve cache directory for downloads")?
        .join("mixsplit");

    std::fs::create_dir_all(&cache_dir)
        .with_context(|| format!("creating download cache directory at {}", cache_dir.display()))?;

    Ok(cache_dir)
}

pub fn config_file_path() -> Result<PathBuf> {
    Ok(mixsplit_config_dir()?.join("config.toml"))
}
