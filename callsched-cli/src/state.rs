use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

pub fn callsched_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("CALLSCHED_HOME") {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".callsched"))
}

pub fn ensure_callsched_home() -> Result<PathBuf> {
    let dir = callsched_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}
