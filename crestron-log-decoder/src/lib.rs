//! Crestron Log Decoder Library
//!
//! A stateless library for turning Crestron control-system debug output into a
//! typed event table and a timeline render plan.
//!
//! # Architecture
//!
//! Three stages, each a pure transformation, composed linearly:
//! - **parser**: one text line → one [`EventRecord`] or nothing
//! - **table**: sort, signal/time filters, signal cap, window normalization
//! - **layout**: lanes, axis extents and drawable series for the chart
//!
//! The library does NOT:
//! - Draw anything (the HTML sink lives in crestron-log-cli)
//! - Handle command-line arguments or config files
//! - Keep state between runs
//!
//! # Example Usage
//!
//! ```no_run
//! use crestron_log_decoder::{Decoder, RenderMode, Series, TableConfig};
//! use std::path::Path;
//!
//! let config = TableConfig::new()
//!     .with_include("^Room1")
//!     .with_tmin(1000.0)
//!     .with_tmax(5000.0);
//!
//! let decoder = Decoder::with_config(config);
//! let table = decoder.decode_file(Path::new("processor.log")).unwrap();
//! let plan = decoder.plan(&table, RenderMode::Steps);
//!
//! for series in &plan.series {
//!     if let Series::Steps { signal, points, .. } = series {
//!         println!("{}: {} vertices", signal, points.len());
//!     }
//! }
//! ```

// Public modules
pub mod config;
pub mod decoder;
pub mod layout;
pub mod parser;
pub mod table;
pub mod types;

// Re-export main types for convenience
pub use config::{TableConfig, DEFAULT_MAX_SIGNALS};
pub use decoder::Decoder;
pub use layout::{
    EdgeMarker, EdgePoint, LaneAssignment, LaneAxis, MarkerKind, MarkerPoint, RenderMode,
    RenderPlan, Series, StepPoint, TimeAxis,
};
pub use parser::ParsedLog;
pub use table::{EventTable, SignalFilter};
pub use types::{DecoderError, EventRecord, Result, SignalType, TypeCounts};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
