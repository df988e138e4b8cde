//! HTML timeline report
//!
//! Converts a [`RenderPlan`] into Plotly traces and a layout, embeds them as
//! JSON in a single page and lets Plotly.js (loaded from its CDN) draw the
//! chart.

use super::ReportMeta;
use anyhow::Result;
use crestron_log_decoder::{EdgeMarker, MarkerKind, RenderPlan, Series};
use serde_json::{json, Value};

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

/// Build the complete HTML page for a plan
pub fn render_html(plan: &RenderPlan, meta: &ReportMeta) -> Result<String> {
    let traces: Vec<Value> = plan.series.iter().map(trace_for).collect();

    let data = json!({
        "traces": traces,
        "layout": layout_for(plan),
        "meta": {
            "source": meta.source,
            "generated": meta.generated,
            "timeOffsetMs": meta.time_offset_ms,
        },
    });

    // "</script>" inside a signal name must not end the data block
    let blob = serde_json::to_string(&data)?.replace("</", "<\\/");

    Ok(TEMPLATE
        .replace("__PLOTLY_CDN__", PLOTLY_CDN)
        .replace("__PAGE_TITLE__", &escape_text(&plan.title))
        .replace("__CHART_DATA__", &blob))
}

fn trace_for(series: &Series) -> Value {
    match series {
        Series::Markers { kind, points } => {
            let (name, marker) = match kind {
                MarkerKind::Serial => ("Serial", json!({ "symbol": "x", "size": 7 })),
                MarkerKind::Analog => ("Analog", json!({ "size": 6 })),
            };
            json!({
                "type": "scatter",
                "mode": "markers",
                "name": name,
                "x": points.iter().map(|p| p.time_ms).collect::<Vec<_>>(),
                "y": points.iter().map(|p| p.lane).collect::<Vec<_>>(),
                "marker": marker,
                "customdata": points
                    .iter()
                    .map(|p| json!([p.signal, p.value_raw]))
                    .collect::<Vec<_>>(),
                "hovertemplate": hover_template(name),
                "showlegend": true,
            })
        }
        Series::Edges {
            signal,
            lane,
            points,
        } => json!({
            "type": "scatter",
            "mode": "markers",
            "name": format!("{} (edges)", signal),
            "x": points.iter().map(|p| p.time_ms).collect::<Vec<_>>(),
            "y": vec![*lane; points.len()],
            "marker": {
                "size": 9,
                "symbol": points.iter().map(|p| edge_symbol(p.marker)).collect::<Vec<_>>(),
            },
            "customdata": points
                .iter()
                .map(|p| json!([signal, p.value]))
                .collect::<Vec<_>>(),
            "hovertemplate": hover_template("Digital (edge)"),
            "showlegend": false,
        }),
        Series::Steps { signal, points, .. } => json!({
            "type": "scatter",
            "mode": "lines",
            "line": { "shape": "hv" },
            "name": signal,
            "x": points.iter().map(|p| p.time_ms).collect::<Vec<_>>(),
            "y": points.iter().map(|p| p.y).collect::<Vec<_>>(),
            "customdata": points
                .iter()
                .map(|p| json!([signal, p.value]))
                .collect::<Vec<_>>(),
            "hovertemplate": hover_template("Digital (step)"),
            "showlegend": false,
        }),
    }
}

fn edge_symbol(marker: EdgeMarker) -> &'static str {
    match marker {
        EdgeMarker::Rising => "triangle-up",
        EdgeMarker::Falling => "triangle-down",
        EdgeMarker::Flat => "circle",
    }
}

fn hover_template(type_label: &str) -> String {
    format!(
        "<b>%{{customdata[0]}}</b><br>Type: {}<br>Value: %{{customdata[1]}}<br>Time: %{{x:.3f}} ms<extra></extra>",
        type_label
    )
}

fn layout_for(plan: &RenderPlan) -> Value {
    let autorange = if plan.y_axis.reversed {
        json!("reversed")
    } else {
        json!(true)
    };

    json!({
        "title": { "text": plan.title },
        "hovermode": "closest",
        "height": plan.height,
        "margin": { "l": 360, "r": 40, "t": 60, "b": 50 },
        "legend": { "orientation": "h", "yanchor": "bottom", "y": 1.02, "xanchor": "left", "x": 0 },
        "yaxis": {
            "title": { "text": "Signal" },
            "tickmode": "array",
            "tickvals": plan.y_axis.tick_values,
            "ticktext": plan.y_axis.tick_labels,
            "autorange": autorange,
            "automargin": true,
        },
        "xaxis": {
            "title": { "text": "Time (ms)" },
            "range": [plan.x_axis.start, plan.x_axis.end],
            "showspikes": true,
            "spikemode": "across",
            "spikesnap": "cursor",
            "showline": true,
        },
    })
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

const TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>__PAGE_TITLE__</title>
  <script src="__PLOTLY_CDN__" charset="utf-8"></script>
  <style>
    body { margin: 0; font-family: -apple-system, "Segoe UI", Roboto, sans-serif; background: #fff; color: #222; }
    #chart { width: 100%; }
    footer { padding: 8px 16px; font-size: 12px; color: #666; border-top: 1px solid #eee; }
  </style>
</head>
<body>
  <div id="chart"></div>
  <footer id="meta"></footer>
  <script id="chart-data" type="application/json">__CHART_DATA__</script>
  <script>
    const D = JSON.parse(document.getElementById("chart-data").textContent);
    Plotly.newPlot("chart", D.traces, D.layout, { responsive: true, displaylogo: false });
    let note = "Source: " + D.meta.source + " | Generated: " + D.meta.generated;
    if (D.meta.timeOffsetMs !== null) {
      note += " | Times shifted by -" + D.meta.timeOffsetMs + " ms";
    }
    document.getElementById("meta").textContent = note;
  </script>
</body>
</html>
"##;
