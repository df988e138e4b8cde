//! Main decoder API
//!
//! The Decoder struct is the entry point for turning a debug log into an
//! event table and a render plan. It owns only its configuration; every call
//! rebuilds its results from scratch.

use crate::config::TableConfig;
use crate::layout::{self, RenderMode, RenderPlan};
use crate::parser::{self, ParsedLog};
use crate::table::{self, EventTable};
use crate::types::Result;
use std::path::Path;

/// The main decoder struct - entry point for all decoding operations
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    config: TableConfig,
}

impl Decoder {
    /// Create a decoder with default settings (no filters, cap of 60 signals)
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a decoder with the given table configuration
    pub fn with_config(config: TableConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// Read a log file fully into memory and parse every line
    ///
    /// Invalid UTF-8 is replaced rather than rejected; debug captures often
    /// contain stray bytes from serial devices.
    ///
    /// # Example
    /// ```no_run
    /// use crestron_log_decoder::Decoder;
    /// use std::path::Path;
    ///
    /// let decoder = Decoder::new();
    /// let parsed = decoder.parse_file(Path::new("processor.log")).unwrap();
    /// println!("{} records", parsed.records.len());
    /// ```
    pub fn parse_file(&self, path: &Path) -> Result<ParsedLog> {
        log::info!("Reading log file: {:?}", path);

        let bytes = std::fs::read(path)?;
        let text = String::from_utf8_lossy(&bytes);
        let parsed = parser::parse_lines(&text);

        log::info!(
            "Parsed {} records ({} lines skipped) from {:?}",
            parsed.records.len(),
            parsed.skipped_lines,
            path
        );
        Ok(parsed)
    }

    /// Parse an in-memory log
    pub fn parse_str(&self, text: &str) -> ParsedLog {
        parser::parse_lines(text)
    }

    /// Sort, filter, cap and normalize parsed records
    pub fn build_table(&self, parsed: ParsedLog) -> Result<EventTable> {
        let table = table::assemble(parsed.records, &self.config)?;
        log::info!(
            "Event table: {} events across {} signals",
            table.len(),
            table.signal_count()
        );
        Ok(table)
    }

    /// Parse a file and build its event table
    pub fn decode_file(&self, path: &Path) -> Result<EventTable> {
        let parsed = self.parse_file(path)?;
        self.build_table(parsed)
    }

    /// Plan the chart for a finished table
    pub fn plan(&self, table: &EventTable, mode: RenderMode) -> RenderPlan {
        layout::plan(table, mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DecoderError;

    #[test]
    fn test_decoder_defaults() {
        let decoder = Decoder::new();
        assert_eq!(decoder.config().max_signals, 60);
        assert!(decoder.config().include.is_none());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let decoder = Decoder::new();
        let result = decoder.parse_file(Path::new("does/not/exist.log"));
        assert!(matches!(result, Err(DecoderError::IoError(_))));
    }

    #[test]
    fn test_parse_str_and_build() {
        let decoder = Decoder::with_config(TableConfig::new().with_tmin(10.0));
        let parsed = decoder.parse_str("0 ms: A -> 0\n10 ms: A -> 1\n20 ms: B -> 3.5k\n");
        let table = decoder.build_table(parsed).unwrap();
        let times: Vec<f64> = table.records().iter().map(|r| r.time_ms).collect();
        assert_eq!(times, vec![0.0, 10.0]);
    }
}
