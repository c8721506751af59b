use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// `$TASKCHAT_HOME`, else `~/.taskchat`.
pub fn taskchat_home() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os("TASKCHAT_HOME").filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".taskchat"))
}

pub fn ensure_taskchat_home() -> Result<PathBuf> {
    let dir = taskchat_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}
