//! Core types for the Crestron log decoder library
//!
//! This module defines the records the parser emits and the errors the
//! pipeline can raise. Records carry no history: the type of a value is decided
//! from its own text only.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result type for decoder operations
pub type Result<T> = std::result::Result<T, DecoderError>;

/// Errors that can occur while building an event table
#[derive(Debug, thiserror::Error)]
pub enum DecoderError {
    #[error("No parseable rows found.")]
    NoParseableRows,

    #[error("No events after filtering. Try widening --tmin/--tmax or removing filters.")]
    EmptyAfterFiltering,

    #[error("Invalid signal pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Kind of a signal value, derived from the lexical shape of the value text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalType {
    /// Exactly `0` or `1`
    Digital,
    /// Numeric, optionally followed by a unit suffix (e.g. `720d`)
    Analog,
    /// Anything else
    Serial,
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalType::Digital => write!(f, "Digital"),
            SignalType::Analog => write!(f, "Analog"),
            SignalType::Serial => write!(f, "Serial"),
        }
    }
}

/// One parsed log line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Millisecond offset (never negative)
    pub time_ms: f64,
    /// Signal name as written before the arrow (trimmed, may be empty)
    pub signal: String,
    /// Value classification
    pub signal_type: SignalType,
    /// Value text as written after the arrow (trimmed)
    pub value_raw: String,
    /// Numeric value for Digital/Analog records
    pub value_num: Option<f64>,
}

impl EventRecord {
    /// Integer level used for digital rendering (missing values count as 0)
    pub fn digital_level(&self) -> i64 {
        self.value_num.unwrap_or(0.0) as i64
    }

    /// Check if this record is a digital sample
    pub fn is_digital(&self) -> bool {
        self.signal_type == SignalType::Digital
    }
}

/// Per-type record counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TypeCounts {
    pub digital: usize,
    pub analog: usize,
    pub serial: usize,
}

impl TypeCounts {
    /// Count one record of the given type
    pub fn add(&mut self, signal_type: SignalType) {
        match signal_type {
            SignalType::Digital => self.digital += 1,
            SignalType::Analog => self.analog += 1,
            SignalType::Serial => self.serial += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.digital + self.analog + self.serial
    }
}
