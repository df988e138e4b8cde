//! Table assembler
//!
//! Sorts parsed records and narrows them down with the user's filters. The
//! stages run in a fixed order and each one sees only what the previous one
//! kept:
//!
//! 1. sort by `(time_ms, signal)`
//! 2. include pattern
//! 3. exclude pattern
//! 4. closed `[tmin, tmax]` window
//! 5. signal cap (earliest first occurrence wins)
//! 6. window normalization

use crate::config::TableConfig;
use crate::types::{DecoderError, EventRecord, Result, TypeCounts};
use regex::Regex;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// Sorted, filtered event table
#[derive(Debug, Clone, PartialEq)]
pub struct EventTable {
    records: Vec<EventRecord>,
    time_offset_ms: Option<f64>,
}

impl EventTable {
    /// Build a table from records, sorting them
    pub fn from_records(mut records: Vec<EventRecord>) -> Self {
        sort_records(&mut records);
        Self {
            records,
            time_offset_ms: None,
        }
    }

    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<EventRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Signal names in first-occurrence order
    pub fn signals(&self) -> Vec<String> {
        first_occurrence_order(&self.records)
    }

    pub fn signal_count(&self) -> usize {
        self.records
            .iter()
            .map(|r| r.signal.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    /// Earliest and latest time, or `None` for an empty table
    pub fn time_range(&self) -> Option<(f64, f64)> {
        let first = self.records.first()?.time_ms;
        Some(self.records.iter().fold((first, first), |(lo, hi), r| {
            (lo.min(r.time_ms), hi.max(r.time_ms))
        }))
    }

    pub fn count_by_type(&self) -> TypeCounts {
        let mut counts = TypeCounts::default();
        for record in &self.records {
            counts.add(record.signal_type);
        }
        counts
    }

    /// Amount subtracted from every time during normalization, if it ran
    pub fn time_offset_ms(&self) -> Option<f64> {
        self.time_offset_ms
    }
}

/// Compiled include/exclude signal patterns
#[derive(Debug, Clone, Default)]
pub struct SignalFilter {
    include: Option<Regex>,
    exclude: Option<Regex>,
}

impl SignalFilter {
    /// Compile the include and exclude patterns
    pub fn new(include: Option<&str>, exclude: Option<&str>) -> Result<Self> {
        Ok(Self {
            include: include.map(compile_pattern).transpose()?,
            exclude: exclude.map(compile_pattern).transpose()?,
        })
    }

    /// Check if a signal survives both patterns (unanchored search)
    pub fn matches(&self, signal: &str) -> bool {
        let included = self.include.as_ref().map_or(true, |re| re.is_match(signal));
        let excluded = self.exclude.as_ref().map_or(false, |re| re.is_match(signal));
        included && !excluded
    }

    /// Keep only records whose signal survives the patterns
    pub fn apply(&self, mut records: Vec<EventRecord>) -> Vec<EventRecord> {
        if let Some(include) = &self.include {
            records.retain(|r| include.is_match(&r.signal));
        }
        if let Some(exclude) = &self.exclude {
            records.retain(|r| !exclude.is_match(&r.signal));
        }
        records
    }
}

fn compile_pattern(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| DecoderError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// Sort records by time, then by signal name
pub fn sort_records(records: &mut [EventRecord]) {
    records.sort_by(compare_records);
}

fn compare_records(a: &EventRecord, b: &EventRecord) -> Ordering {
    a.time_ms
        .total_cmp(&b.time_ms)
        .then_with(|| a.signal.cmp(&b.signal))
}

/// Distinct signal names ordered by earliest time, ties in encounter order
pub fn first_occurrence_order(records: &[EventRecord]) -> Vec<String> {
    let mut firsts: Vec<(&str, f64)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in records {
        match index.get(record.signal.as_str()) {
            Some(&i) => {
                if record.time_ms < firsts[i].1 {
                    firsts[i].1 = record.time_ms;
                }
            }
            None => {
                index.insert(record.signal.as_str(), firsts.len());
                firsts.push((record.signal.as_str(), record.time_ms));
            }
        }
    }

    // Stable: equal first times keep encounter order
    firsts.sort_by(|a, b| a.1.total_cmp(&b.1));
    firsts.into_iter().map(|(name, _)| name.to_string()).collect()
}

/// Build the final event table from parsed records
///
/// # Errors
/// * `NoParseableRows` if `records` is empty, checked before the patterns
/// * `InvalidPattern` if a regex does not compile
/// * `EmptyAfterFiltering` if the filters or the cap remove every record
pub fn assemble(mut records: Vec<EventRecord>, config: &TableConfig) -> Result<EventTable> {
    sort_records(&mut records);
    if records.is_empty() {
        return Err(DecoderError::NoParseableRows);
    }
    let parsed_count = records.len();

    let filter = SignalFilter::new(config.include.as_deref(), config.exclude.as_deref())?;

    let mut records = filter.apply(records);
    if config.has_time_window() {
        records.retain(|r| config.in_time_window(r.time_ms));
    }

    log::debug!(
        "Filters kept {} of {} records",
        records.len(),
        parsed_count
    );

    if records.is_empty() {
        return Err(DecoderError::EmptyAfterFiltering);
    }

    let order = first_occurrence_order(&records);
    if order.len() > config.max_signals {
        log::info!(
            "Capping {} signals to the first {}",
            order.len(),
            config.max_signals
        );
        let keep: HashSet<&str> = order
            .iter()
            .take(config.max_signals)
            .map(String::as_str)
            .collect();
        records.retain(|r| keep.contains(r.signal.as_str()));

        if records.is_empty() {
            return Err(DecoderError::EmptyAfterFiltering);
        }
    }

    let mut table = EventTable {
        records,
        time_offset_ms: None,
    };

    if config.should_normalize() {
        if let Some((t0, _)) = table.time_range() {
            log::debug!("Normalizing times by {} ms", t0);
            for record in &mut table.records {
                record.time_ms -= t0;
            }
            table.time_offset_ms = Some(t0);
        }
    }

    Ok(table)
}
