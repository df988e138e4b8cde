//! Plain-text summary of an event table

use crestron_log_decoder::{EventTable, SignalType};
use std::collections::HashMap;

struct SignalRow {
    signal: String,
    types: Vec<SignalType>,
    events: usize,
    first_ms: f64,
    last_ms: f64,
}

/// One row per signal in lane order, followed by totals
pub fn render_summary(table: &EventTable) -> String {
    let rows = collect_rows(table);
    let name_width = rows
        .iter()
        .map(|r| r.signal.chars().count())
        .max()
        .unwrap_or(0)
        .max("Signal".len());

    let mut out = format!(
        "{:<width$}  {:<15}  {:>7}  {:>12}  {:>12}\n",
        "Signal",
        "Type",
        "Events",
        "First (ms)",
        "Last (ms)",
        width = name_width
    );
    out.push_str(&"-".repeat(name_width + 56));
    out.push('\n');

    for row in &rows {
        let types = row
            .types
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join("/");
        out.push_str(&format!(
            "{:<width$}  {:<15}  {:>7}  {:>12.3}  {:>12.3}\n",
            row.signal,
            types,
            row.events,
            row.first_ms,
            row.last_ms,
            width = name_width
        ));
    }

    let counts = table.count_by_type();
    out.push_str(&format!(
        "\n{} signals, {} events ({} digital, {} analog, {} serial)\n",
        rows.len(),
        table.len(),
        counts.digital,
        counts.analog,
        counts.serial
    ));
    out
}

fn collect_rows(table: &EventTable) -> Vec<SignalRow> {
    let mut rows: HashMap<&str, SignalRow> = HashMap::new();

    for record in table.records() {
        let row = rows.entry(record.signal.as_str()).or_insert_with(|| SignalRow {
            signal: record.signal.clone(),
            types: Vec::new(),
            events: 0,
            first_ms: record.time_ms,
            last_ms: record.time_ms,
        });
        row.events += 1;
        row.first_ms = row.first_ms.min(record.time_ms);
        row.last_ms = row.last_ms.max(record.time_ms);
        if !row.types.contains(&record.signal_type) {
            row.types.push(record.signal_type);
        }
    }

    table
        .signals()
        .iter()
        .filter_map(|name| rows.remove(name.as_str()))
        .collect()
}
