use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use taskchat_core::SearchConfig;

use crate::state::{ensure_taskchat_home, taskchat_home};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub vault: VaultSection,
    #[serde(flatten)]
    pub search: SearchConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VaultSection {
    /// Default vault root for `search` and `tasks`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

pub fn config_path() -> Result<PathBuf> {
    Ok(taskchat_home()?.join("config.toml"))
}

/// Defaults when the file is absent. The result is always validated.
pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    let cfg = if p.exists() {
        let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
        parse_config(&s).with_context(|| format!("parse {}", p.display()))?
    } else {
        Config::default()
    };
    cfg.search
        .validate()
        .with_context(|| format!("invalid config {}", p.display()))?;
    Ok(cfg)
}

pub fn parse_config(s: &str) -> Result<Config> {
    Ok(toml::from_str(s)?)
}

pub fn save_config(cfg: &Config) -> Result<PathBuf> {
    let p = ensure_taskchat_home()?.join("config.toml");
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(p)
}

pub fn init_config(vault: Option<PathBuf>) -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    let cfg = Config {
        vault: VaultSection { path: vault },
        ..Default::default()
    };
    let p = save_config(&cfg)?;
    println!("Wrote {}", p.display());
    Ok(())
}
