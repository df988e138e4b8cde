//! Configuration loading and merging
//!
//! Settings come from three places, highest priority first: command-line
//! flags, an optional TOML file, built-in defaults.

use anyhow::{bail, Context, Result};
use crestron_log_decoder::{RenderMode, TableConfig, DEFAULT_MAX_SIGNALS};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Application configuration (loaded from a TOML file)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub render: RenderConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FilterConfig {
    pub only: Option<String>,
    pub exclude: Option<String>,
    pub tmin: Option<f64>,
    pub tmax: Option<f64>,
    pub max_signals: Option<usize>,
    #[serde(default)]
    pub absolute_time: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RenderConfig {
    pub mode: Option<RenderMode>,
    pub out: Option<PathBuf>,
}

/// Command-line values that override the config file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub out: Option<PathBuf>,
    pub only: Option<String>,
    pub exclude: Option<String>,
    pub tmin: Option<f64>,
    pub tmax: Option<f64>,
    pub max_signals: Option<usize>,
    pub mode: Option<RenderMode>,
    pub absolute_time: bool,
}

/// Fully resolved settings for one run
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub table: TableConfig,
    pub mode: RenderMode,
    pub out: PathBuf,
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    Ok(config)
}

/// Merge flags over the config file over defaults
pub fn resolve(log_path: &Path, config: &AppConfig, overrides: Overrides) -> Result<RunSettings> {
    let filter = &config.filter;

    let max_signals = overrides
        .max_signals
        .or(filter.max_signals)
        .unwrap_or(DEFAULT_MAX_SIGNALS);
    if max_signals == 0 {
        bail!("max_signals must be at least 1");
    }

    let tmin = overrides.tmin.or(filter.tmin);
    let tmax = overrides.tmax.or(filter.tmax);
    if let (Some(lo), Some(hi)) = (tmin, tmax) {
        if lo > hi {
            log::warn!("tmin ({}) is greater than tmax ({}); no event can match", lo, hi);
        }
    }

    let table = TableConfig {
        include: overrides.only.or_else(|| filter.only.clone()),
        exclude: overrides.exclude.or_else(|| filter.exclude.clone()),
        tmin,
        tmax,
        max_signals,
        absolute_time: overrides.absolute_time || filter.absolute_time,
    };

    let mode = overrides.mode.or(config.render.mode).unwrap_or_default();
    let out = overrides
        .out
        .or_else(|| config.render.out.clone())
        .unwrap_or_else(|| default_output_path(log_path, mode));

    Ok(RunSettings { table, mode, out })
}

/// `<log>.<mode>.html` next to the input, replacing its last extension
pub fn default_output_path(log_path: &Path, mode: RenderMode) -> PathBuf {
    log_path.with_extension(format!("{}.html", mode))
}
