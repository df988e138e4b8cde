//! Layout / render planner
//!
//! Derives everything the chart needs from a finished [`EventTable`]: one lane
//! per signal, the axis extents and the drawable series. The table itself is
//! only read.
//!
//! Serial and analog values become two marker series spanning all lanes.
//! Digital signals get one series each, drawn either as change markers
//! ([`RenderMode::Edges`]) or as a held step line ([`RenderMode::Steps`]).

use crate::table::{first_occurrence_order, EventTable};
use crate::types::{EventRecord, SignalType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Minimum padding added after the last event, in ms
const MIN_END_PADDING_MS: f64 = 10.0;

/// Padding as a fraction of the visible time span
const END_PADDING_FRACTION: f64 = 0.02;

/// Vertical offset of a step line from its lane center
const STEP_OFFSET: f64 = 0.25;

const MIN_HEIGHT_PX: u32 = 800;
const LANE_HEIGHT_PX: u32 = 28;

/// How digital signals are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Markers at value changes only
    #[default]
    Edges,
    /// Right-continuous step line held to the end of the plot
    Steps,
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderMode::Edges => write!(f, "edges"),
            RenderMode::Steps => write!(f, "steps"),
        }
    }
}

impl FromStr for RenderMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "edges" => Ok(RenderMode::Edges),
            "steps" => Ok(RenderMode::Steps),
            other => Err(format!("unknown render mode {:?} (expected edges or steps)", other)),
        }
    }
}

/// Signal name to lane index, dense from 0
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LaneAssignment {
    order: Vec<String>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl LaneAssignment {
    /// Assign lanes by first occurrence time
    pub fn from_records(records: &[EventRecord]) -> Self {
        let order = first_occurrence_order(records);
        let index = order
            .iter()
            .enumerate()
            .map(|(lane, name)| (name.clone(), lane))
            .collect();
        Self { order, index }
    }

    pub fn lane(&self, signal: &str) -> Option<usize> {
        self.index.get(signal).copied()
    }

    /// Signal names, lane 0 first
    pub fn names(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Horizontal extent of the plot
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeAxis {
    /// Earliest event time
    pub start: f64,
    /// Latest event time
    pub last_event: f64,
    /// Padded right edge
    pub end: f64,
}

impl TimeAxis {
    fn from_range(start: f64, last_event: f64) -> Self {
        let padding = MIN_END_PADDING_MS.max((last_event - start) * END_PADDING_FRACTION);
        Self {
            start,
            last_event,
            end: last_event + padding,
        }
    }
}

/// Vertical axis: one tick per lane, lane 0 at the top
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaneAxis {
    pub tick_values: Vec<usize>,
    pub tick_labels: Vec<String>,
    pub reversed: bool,
}

/// Which non-digital type a marker series shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MarkerKind {
    Serial,
    Analog,
}

impl MarkerKind {
    pub fn signal_type(self) -> SignalType {
        match self {
            MarkerKind::Serial => SignalType::Serial,
            MarkerKind::Analog => SignalType::Analog,
        }
    }
}

/// Direction of a digital change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EdgeMarker {
    Rising,
    Falling,
    Flat,
}

/// A serial or analog sample
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerPoint {
    pub time_ms: f64,
    pub lane: usize,
    pub signal: String,
    pub value_raw: String,
}

/// A digital change point
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EdgePoint {
    pub time_ms: f64,
    pub value: i64,
    pub marker: EdgeMarker,
}

/// A vertex of a digital step line
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StepPoint {
    pub time_ms: f64,
    pub y: f64,
    pub value: i64,
}

/// One drawable series
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "series")]
pub enum Series {
    Markers {
        kind: MarkerKind,
        points: Vec<MarkerPoint>,
    },
    Edges {
        signal: String,
        lane: usize,
        points: Vec<EdgePoint>,
    },
    Steps {
        signal: String,
        lane: usize,
        points: Vec<StepPoint>,
    },
}

/// Everything the chart sink needs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderPlan {
    pub mode: RenderMode,
    pub title: String,
    pub height: u32,
    pub event_count: usize,
    pub lanes: LaneAssignment,
    pub x_axis: TimeAxis,
    pub y_axis: LaneAxis,
    pub series: Vec<Series>,
}

/// Build a render plan for a finished table
pub fn plan(table: &EventTable, mode: RenderMode) -> RenderPlan {
    let records = table.records();
    let lanes = LaneAssignment::from_records(records);
    let (t_min, t_max) = table.time_range().unwrap_or((0.0, 0.0));
    let x_axis = TimeAxis::from_range(t_min, t_max);

    let mut series = Vec::new();
    for kind in [MarkerKind::Serial, MarkerKind::Analog] {
        if let Some(markers) = marker_series(records, &lanes, kind) {
            series.push(markers);
        }
    }

    let digital = digital_samples(records);
    for (lane, signal) in lanes.names().iter().enumerate() {
        let Some(samples) = digital.get(signal.as_str()) else {
            continue;
        };
        let drawn = match mode {
            RenderMode::Edges => {
                let points = edge_points(samples);
                if points.is_empty() {
                    continue;
                }
                Series::Edges {
                    signal: signal.clone(),
                    lane,
                    points,
                }
            }
            RenderMode::Steps => Series::Steps {
                signal: signal.clone(),
                lane,
                points: step_points(samples, lane, x_axis.end),
            },
        };
        series.push(drawn);
    }

    log::debug!(
        "Planned {} series over {} lanes (mode={})",
        series.len(),
        lanes.len(),
        mode
    );

    let lane_count = lanes.len();
    RenderPlan {
        mode,
        title: format!(
            "Signal Timeline — mode={} — {} signals, {} events",
            mode,
            lane_count,
            records.len()
        ),
        height: MIN_HEIGHT_PX.max(LANE_HEIGHT_PX.saturating_mul(lane_count as u32)),
        event_count: records.len(),
        y_axis: LaneAxis {
            tick_values: (0..lane_count).collect(),
            tick_labels: lanes.names().to_vec(),
            reversed: true,
        },
        lanes,
        x_axis,
        series,
    }
}

fn marker_series(
    records: &[EventRecord],
    lanes: &LaneAssignment,
    kind: MarkerKind,
) -> Option<Series> {
    let wanted = kind.signal_type();
    let points: Vec<MarkerPoint> = records
        .iter()
        .filter(|r| r.signal_type == wanted)
        .filter_map(|r| {
            Some(MarkerPoint {
                time_ms: r.time_ms,
                lane: lanes.lane(&r.signal)?,
                signal: r.signal.clone(),
                value_raw: r.value_raw.clone(),
            })
        })
        .collect();

    if points.is_empty() {
        None
    } else {
        Some(Series::Markers { kind, points })
    }
}

/// Digital samples grouped per signal, in table order
fn digital_samples(records: &[EventRecord]) -> HashMap<&str, Vec<&EventRecord>> {
    let mut grouped: HashMap<&str, Vec<&EventRecord>> = HashMap::new();
    for record in records.iter().filter(|r| r.is_digital()) {
        grouped.entry(record.signal.as_str()).or_default().push(record);
    }
    grouped
}

/// Change points of one digital signal
///
/// The first sample is always emitted as `Flat`; every later sample is
/// compared against the sample right before it.
pub fn edge_points(samples: &[&EventRecord]) -> Vec<EdgePoint> {
    let mut points = Vec::new();
    let mut previous: Option<i64> = None;

    for sample in samples {
        let level = sample.digital_level();
        let marker = match previous {
            None => Some(EdgeMarker::Flat),
            Some(before) if level > before => Some(EdgeMarker::Rising),
            Some(before) if level < before => Some(EdgeMarker::Falling),
            Some(_) => None,
        };

        if let Some(marker) = marker {
            points.push(EdgePoint {
                time_ms: sample.time_ms,
                value: level,
                marker,
            });
        }

        previous = Some(level);
    }

    points
}

/// Step line of one digital signal, held to `end_ms`
pub fn step_points(samples: &[&EventRecord], lane: usize, end_ms: f64) -> Vec<StepPoint> {
    let mut points: Vec<StepPoint> = samples
        .iter()
        .map(|sample| step_point(sample.time_ms, sample.digital_level(), lane))
        .collect();

    if let Some(last) = points.last().copied() {
        points.push(step_point(end_ms.max(last.time_ms), last.value, lane));
    }

    points
}

fn step_point(time_ms: f64, value: i64, lane: usize) -> StepPoint {
    let offset = if value == 1 { STEP_OFFSET } else { -STEP_OFFSET };
    StepPoint {
        time_ms,
        y: lane as f64 + offset,
        value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_line;

    fn table(lines: &[&str]) -> EventTable {
        EventTable::from_records(lines.iter().filter_map(|l| parse_line(l)).collect())
    }

    #[test]
    fn test_render_mode_parsing() {
        assert_eq!("edges".parse::<RenderMode>(), Ok(RenderMode::Edges));
        assert_eq!("Steps".parse::<RenderMode>(), Ok(RenderMode::Steps));
        assert!("lines".parse::<RenderMode>().is_err());
        assert_eq!(RenderMode::default(), RenderMode::Edges);
        assert_eq!(RenderMode::Steps.to_string(), "steps");
    }

    #[test]
    fn test_lane_order_by_first_occurrence() {
        let t = table(&["50ms: A -> 1", "10ms: B -> 1", "60ms: A -> 0"]);
        let lanes = LaneAssignment::from_records(t.records());
        assert_eq!(lanes.names(), &["B".to_string(), "A".to_string()]);
        assert_eq!(lanes.lane("B"), Some(0));
        assert_eq!(lanes.lane("A"), Some(1));
        assert_eq!(lanes.lane("C"), None);
    }

    #[test]
    fn test_x_axis_padding() {
        let t = table(&["0ms: A -> 1", "100ms: A -> 0"]);
        assert_eq!(plan(&t, RenderMode::Edges).x_axis.end, 110.0);

        let t = table(&["0ms: A -> 1", "10000ms: A -> 0"]);
        let axis = plan(&t, RenderMode::Edges).x_axis;
        assert_eq!(axis.start, 0.0);
        assert_eq!(axis.last_event, 10000.0);
        assert_eq!(axis.end, 10200.0);
    }

    #[test]
    fn test_edges_only_emit_changes() {
        let t = table(&[
            "0ms: Relay -> 0",
            "10ms: Relay -> 0",
            "20ms: Relay -> 1",
            "30ms: Relay -> 1",
            "40ms: Relay -> 0",
        ]);
        let plan = plan(&t, RenderMode::Edges);
        assert_eq!(plan.series.len(), 1);
        match &plan.series[0] {
            Series::Edges { signal, lane, points } => {
                assert_eq!(signal, "Relay");
                assert_eq!(*lane, 0);
                let times: Vec<f64> = points.iter().map(|p| p.time_ms).collect();
                assert_eq!(times, vec![0.0, 20.0, 40.0]);
                let markers: Vec<EdgeMarker> = points.iter().map(|p| p.marker).collect();
                assert_eq!(
                    markers,
                    vec![EdgeMarker::Flat, EdgeMarker::Rising, EdgeMarker::Falling]
                );
            }
            other => panic!("unexpected series {:?}", other),
        }
    }

    #[test]
    fn test_first_sample_is_flat() {
        let t = table(&["0ms: Relay -> 1", "5ms: Relay -> 1", "9ms: Relay -> 0"]);
        let samples: Vec<&EventRecord> = t.records().iter().collect();
        let points = edge_points(&samples);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].marker, EdgeMarker::Flat);
        assert_eq!(points[0].value, 1);
        assert_eq!(points[1].marker, EdgeMarker::Falling);

        let t = table(&["0ms: Relay -> 0"]);
        let samples: Vec<&EventRecord> = t.records().iter().collect();
        assert_eq!(edge_points(&samples)[0].marker, EdgeMarker::Flat);
    }

    #[test]
    fn test_steps_hold_last_value_to_end() {
        let t = table(&[
            "0ms: Power -> 1",
            "5ms: Mute -> 0",
            "40ms: Power -> 0",
            "500ms: Volume -> 10",
        ]);
        let plan = plan(&t, RenderMode::Steps);
        let end = plan.x_axis.end;
        let steps: Vec<&Series> = plan
            .series
            .iter()
            .filter(|s| matches!(s, Series::Steps { .. }))
            .collect();
        assert_eq!(steps.len(), 2);

        for series in steps {
            if let Series::Steps { lane, points, .. } = series {
                let last = points.last().unwrap();
                let held = points[points.len() - 2];
                assert!(last.time_ms >= end);
                assert_eq!(last.value, held.value);
                assert_eq!(last.y, held.y);
                for p in points {
                    let expected = if p.value == 1 { 0.25 } else { -0.25 };
                    assert_eq!(p.y, *lane as f64 + expected);
                }
            }
        }
    }

    #[test]
    fn test_marker_series_per_type() {
        let t = table(&[
            "0ms: Codec -> READY",
            "1ms: Volume -> 720d",
            "2ms: Codec -> BUSY",
            "3ms: Power -> 1",
        ]);
        let plan = plan(&t, RenderMode::Edges);
        assert_eq!(plan.series.len(), 3);

        match &plan.series[0] {
            Series::Markers { kind, points } => {
                assert_eq!(*kind, MarkerKind::Serial);
                assert_eq!(points.len(), 2);
                assert_eq!(points[1].value_raw, "BUSY");
                assert_eq!(points[1].lane, 0);
            }
            other => panic!("unexpected series {:?}", other),
        }
        match &plan.series[1] {
            Series::Markers { kind, points } => {
                assert_eq!(*kind, MarkerKind::Analog);
                assert_eq!(points[0].signal, "Volume");
                assert_eq!(points[0].lane, 1);
            }
            other => panic!("unexpected series {:?}", other),
        }
    }

    #[test]
    fn test_plan_axes_and_title() {
        let t = table(&["0ms: A -> 1", "10ms: B -> 0", "20ms: A -> 0"]);
        let plan = plan(&t, RenderMode::Steps);
        assert_eq!(plan.y_axis.tick_values, vec![0, 1]);
        assert_eq!(plan.y_axis.tick_labels, vec!["A", "B"]);
        assert!(plan.y_axis.reversed);
        assert_eq!(plan.height, 800);
        assert_eq!(plan.title, "Signal Timeline — mode=steps — 2 signals, 3 events");
    }

    #[test]
    fn test_height_grows_with_lanes() {
        let lines: Vec<String> = (0..40).map(|i| format!("{}ms: S{} -> 1", i, i)).collect();
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        assert_eq!(plan(&table(&refs), RenderMode::Edges).height, 40 * 28);
    }

    #[test]
    fn test_plan_does_not_change_table() {
        let t = table(&["0ms: A -> 1", "10ms: A -> 0"]);
        let before = t.clone();
        let _ = plan(&t, RenderMode::Steps);
        assert_eq!(t, before);
    }
}
