//! Line parser
//!
//! Turns one line of Crestron debug output into an [`EventRecord`]:
//!
//! ```text
//! 0 ms: Room1_Power_On -> 1
//! 00:00:10.031: Room1_Volume -> 720d
//! ```
//!
//! The parser is lenient on purpose. Lines that do not have the
//! `<time>: <signal> -> <value>` shape are routine noise in these logs and are
//! skipped without raising an error.

use crate::types::{EventRecord, SignalType};
use regex::Regex;
use std::sync::LazyLock;

/// Separator between the time stamp and the rest of the line
const TIME_SEPARATOR: &str = ": ";

/// Separator between the signal name and its value
const VALUE_ARROW: &str = " -> ";

// "16 ms", "16  MS", "0ms"
static RE_MS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*([0-9]+(?:\.[0-9]+)?)\s*ms\s*$").unwrap());

// "00:00:10.031", "1:02:03", "00:00:01.5"
static RE_HMS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([0-9]{1,2}):([0-9]{2}):([0-9]{2})(?:\.([0-9]+))?\s*$").unwrap()
});

/// All records parsed from one buffer, plus line statistics
#[derive(Debug, Clone, Default)]
pub struct ParsedLog {
    /// Records in file order (not yet sorted)
    pub records: Vec<EventRecord>,
    /// Number of lines seen
    pub lines_read: usize,
    /// Lines that were empty after trimming
    pub blank_lines: usize,
    /// Non-blank lines that did not produce a record
    pub skipped_lines: usize,
}

impl ParsedLog {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Parse every line of `text`
pub fn parse_lines(text: &str) -> ParsedLog {
    let mut parsed = ParsedLog::default();

    for (index, line) in text.lines().enumerate() {
        parsed.lines_read += 1;

        if line.trim().is_empty() {
            parsed.blank_lines += 1;
            continue;
        }

        match parse_line(line) {
            Some(record) => parsed.records.push(record),
            None => {
                log::trace!("Skipping line {}: {:?}", index + 1, line);
                parsed.skipped_lines += 1;
            }
        }
    }

    log::debug!(
        "Parsed {} records from {} lines ({} blank, {} skipped)",
        parsed.records.len(),
        parsed.lines_read,
        parsed.blank_lines,
        parsed.skipped_lines
    );

    parsed
}

/// Parse a single log line
///
/// # Returns
/// * `Some(EventRecord)` if the line has a time, a signal arrow and a parseable time
/// * `None` for blank or malformed lines
pub fn parse_line(line: &str) -> Option<EventRecord> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    // First ": " only, so "00:00:10.031: x -> 1" keeps its clock time intact
    let (time_part, rest) = line.split_once(TIME_SEPARATOR)?;
    let (signal_part, value_part) = rest.split_once(VALUE_ARROW)?;

    let time_ms = parse_time_ms(time_part)?;

    let signal = signal_part.trim().to_string();
    let value_raw = value_part.trim().to_string();
    let signal_type = classify_value(&value_raw);

    let value_num = match signal_type {
        SignalType::Digital | SignalType::Analog => numeric_value(&value_raw),
        SignalType::Serial => None,
    };

    Some(EventRecord {
        time_ms,
        signal,
        signal_type,
        value_raw,
        value_num,
    })
}

/// Convert a time stamp to milliseconds
///
/// Accepted forms, tried in order:
/// 1. `<number>ms` (case-insensitive, whitespace allowed before `ms`)
/// 2. `HH:MM:SS[.fff]` (fraction padded or truncated to 3 digits)
/// 3. a bare number of milliseconds
pub fn parse_time_ms(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Some(caps) = RE_MS.captures(text) {
        return caps[1].parse::<f64>().ok().filter(|ms| ms.is_finite());
    }

    if let Some(caps) = RE_HMS.captures(text) {
        let hours: u64 = caps[1].parse().ok()?;
        let minutes: u64 = caps[2].parse().ok()?;
        let seconds: u64 = caps[3].parse().ok()?;
        let millis = match caps.get(4) {
            Some(frac) => fraction_to_millis(frac.as_str())?,
            None => 0,
        };
        let total = (hours * 3600 + minutes * 60 + seconds) * 1000 + millis;
        return Some(total as f64);
    }

    text.parse::<f64>()
        .ok()
        .filter(|ms| ms.is_finite() && *ms >= 0.0)
}

/// "5" -> 500, "03" -> 30, "0314" -> 31
fn fraction_to_millis(digits: &str) -> Option<u64> {
    let head = &digits[..digits.len().min(3)];
    format!("{:0<3}", head).parse().ok()
}

/// Classify a value by its shape
///
/// Only the literal strings `0` and `1` are digital. Anything that parses as a
/// number once a trailing run of letters is removed is analog (`10`, `720d`,
/// `3.5k`). Everything else is serial, including `12a3`, since letters in the
/// middle are never stripped.
pub fn classify_value(value: &str) -> SignalType {
    let value = value.trim();
    if value == "0" || value == "1" {
        return SignalType::Digital;
    }

    if numeric_value(value).is_some() {
        SignalType::Analog
    } else {
        SignalType::Serial
    }
}

/// Numeric part of a value, after removing a trailing unit suffix
pub fn numeric_value(value: &str) -> Option<f64> {
    strip_unit_suffix(value).trim().parse::<f64>().ok()
}

fn strip_unit_suffix(value: &str) -> &str {
    value
        .trim_end()
        .trim_end_matches(|c: char| c.is_ascii_alphabetic())
}
