//! Report generation
//!
//! HTML timeline chart (the run's single output file) and a plain-text
//! per-signal summary for the terminal.

pub mod html;
pub mod txt;

/// Context shown alongside the chart
#[derive(Debug, Clone)]
pub struct ReportMeta {
    /// Input log path as given on the command line
    pub source: String,
    /// Local time the report was generated
    pub generated: String,
    /// Amount subtracted from every time, when window normalization ran
    pub time_offset_ms: Option<f64>,
}

impl ReportMeta {
    pub fn new(source: impl Into<String>, time_offset_ms: Option<f64>) -> Self {
        Self {
            source: source.into(),
            generated: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            time_offset_ms,
        }
    }
}
