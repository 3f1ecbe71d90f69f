use anyhow::{Context, Result};
use callsched_core::{SchedulePolicy, Tz, parse_zone};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::{callsched_home, ensure_callsched_home};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub schedule: ScheduleSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSection {
    #[serde(default = "default_timezone")]
    pub default_timezone: String,
    #[serde(default = "default_buffer")]
    pub buffer_minutes: i64,
    #[serde(default = "default_lead")]
    pub default_lead_minutes: i64,
    #[serde(default = "default_min_lead")]
    pub min_lead_minutes: i64,
    #[serde(default)]
    pub reject_nonexistent: bool,
}

fn default_timezone() -> String {
    "America/New_York".to_string()
}

fn default_buffer() -> i64 {
    SchedulePolicy::default().buffer_minutes
}

fn default_lead() -> i64 {
    SchedulePolicy::default().default_lead_minutes
}

fn default_min_lead() -> i64 {
    SchedulePolicy::default().min_lead_minutes
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schedule: ScheduleSection {
                default_timezone: default_timezone(),
                buffer_minutes: default_buffer(),
                default_lead_minutes: default_lead(),
                min_lead_minutes: default_min_lead(),
                reject_nonexistent: false,
            },
        }
    }
}

impl Config {
    pub fn policy(&self) -> SchedulePolicy {
        SchedulePolicy {
            buffer_minutes: self.schedule.buffer_minutes,
            default_lead_minutes: self.schedule.default_lead_minutes,
            min_lead_minutes: self.schedule.min_lead_minutes,
            reject_nonexistent: self.schedule.reject_nonexistent,
        }
    }

    /// `--tz` wins over the configured default.
    pub fn zone(&self, flag: Option<&str>) -> Result<Tz> {
        let name = flag.unwrap_or(&self.schedule.default_timezone);
        Ok(parse_zone(name)?)
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(callsched_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(p: &Path) -> Result<Config> {
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    let cfg: Config = toml::from_str(&s).with_context(|| format!("parse {}", p.display()))?;
    parse_zone(&cfg.schedule.default_timezone)
        .with_context(|| format!("schedule.default_timezone in {}", p.display()))?;
    cfg.policy()
        .validate()
        .with_context(|| format!("[schedule] in {}", p.display()))?;
    Ok(cfg)
}

pub fn save_config(cfg: &Config) -> Result<PathBuf> {
    let p = ensure_callsched_home()?.join("config.toml");
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(p)
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    let p = save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}
