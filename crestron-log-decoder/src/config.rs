//! Table assembly configuration
//!
//! Signal filters, the time window, the signal cap and the normalization
//! switch. Everything is optional; a default config keeps every record.

use serde::{Deserialize, Serialize};

/// Default cap on the number of distinct signals in one chart
pub const DEFAULT_MAX_SIGNALS: usize = 60;

/// Configuration for the table assembler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Optional: keep only signals matching this regex
    #[serde(default)]
    pub include: Option<String>,

    /// Optional: drop signals matching this regex
    #[serde(default)]
    pub exclude: Option<String>,

    /// Optional: lower time bound in ms (inclusive)
    #[serde(default)]
    pub tmin: Option<f64>,

    /// Optional: upper time bound in ms (inclusive)
    #[serde(default)]
    pub tmax: Option<f64>,

    /// Maximum number of signals kept, earliest first occurrence wins (default: 60)
    #[serde(default = "default_max_signals")]
    pub max_signals: usize,

    /// Keep absolute times even when a time window is set
    #[serde(default)]
    pub absolute_time: bool,
}

fn default_max_signals() -> usize {
    DEFAULT_MAX_SIGNALS
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            include: None,
            exclude: None,
            tmin: None,
            tmax: None,
            max_signals: DEFAULT_MAX_SIGNALS,
            absolute_time: false,
        }
    }
}

impl TableConfig {
    /// Create a new table configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the include pattern
    pub fn with_include(mut self, pattern: impl Into<String>) -> Self {
        self.include = Some(pattern.into());
        self
    }

    /// Builder method: set the exclude pattern
    pub fn with_exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude = Some(pattern.into());
        self
    }

    /// Builder method: set the lower time bound
    pub fn with_tmin(mut self, tmin: f64) -> Self {
        self.tmin = Some(tmin);
        self
    }

    /// Builder method: set the upper time bound
    pub fn with_tmax(mut self, tmax: f64) -> Self {
        self.tmax = Some(tmax);
        self
    }

    /// Builder method: set the signal cap
    pub fn with_max_signals(mut self, max_signals: usize) -> Self {
        self.max_signals = max_signals;
        self
    }

    /// Builder method: keep absolute times
    pub fn with_absolute_time(mut self, enabled: bool) -> Self {
        self.absolute_time = enabled;
        self
    }

    /// True if either time bound is set
    pub fn has_time_window(&self) -> bool {
        self.tmin.is_some() || self.tmax.is_some()
    }

    /// True if times should be shifted so the window starts at zero
    pub fn should_normalize(&self) -> bool {
        self.has_time_window() && !self.absolute_time
    }

    /// Check if a time lies inside the configured window
    pub fn in_time_window(&self, time_ms: f64) -> bool {
        let above_min = self.tmin.map_or(true, |tmin| time_ms >= tmin);
        let below_max = self.tmax.map_or(true, |tmax| time_ms <= tmax);
        above_min && below_max
    }
}
