//! Rendering of fairness results. Every function here is pure: it turns a
//! result structure into text, JSON or SVG and leaves output to the caller.

pub mod chart;
pub mod text;

pub use chart::{bar_chart_ascii, bar_chart_svg};
pub use text::{render_conditional, render_parity, render_performance, render_report};

use equitas_metrics::FairnessReport;

/// Pretty-printed JSON form of a report.
pub fn to_json(report: &FairnessReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}
