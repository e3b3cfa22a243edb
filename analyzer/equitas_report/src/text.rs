//! Plain-text report rendering.

use std::fmt::Write as _;

use equitas_metrics::{
    ColumnParity, ColumnRole, ConditionalAnalysis, FairnessReport, ParityReport,
    PerformanceAnalysis,
};

fn rate(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.4}"))
}

fn label_width<'a>(labels: impl Iterator<Item = &'a String>) -> usize {
    labels.map(|l| l.chars().count()).max().unwrap_or(0)
}

/// Proportions and verdict for one sensitive column.
pub fn render_parity(column: &str, report: &ParityReport) -> String {
    let mut out = format!("Statistical parity on '{column}'\n");
    let labels: Vec<String> = report.proportions.keys().map(ToString::to_string).collect();
    let width = label_width(labels.iter());
    for (label, p) in labels.iter().zip(report.proportions.values()) {
        let _ = writeln!(out, "  {label:<width$}  {p:.4}");
    }
    let verdict = &report.verdict;
    match verdict.disparity {
        Some(d) => {
            let (cmp, word) = if verdict.fair {
                ("<=", "fair")
            } else {
                (">", "UNFAIR")
            };
            let _ = writeln!(
                out,
                "  disparity {d:.4} {cmp} threshold {:.4}: {word}",
                verdict.threshold
            );
        }
        None => out.push_str("  no groups to compare: fair\n"),
    }
    out
}

/// Matrix of stratified means; absent cells print as `-`.
pub fn render_conditional(analysis: &ConditionalAnalysis) -> String {
    let matrix = &analysis.matrix;
    let mut out = format!(
        "Conditional parity of '{}' given '{}'\n",
        analysis.sensitive_column, analysis.control_column
    );
    if matrix.is_empty() {
        out.push_str("  no observations\n");
        return out;
    }

    let rows: Vec<String> = matrix
        .sensitive_levels()
        .iter()
        .map(ToString::to_string)
        .collect();
    let cols: Vec<String> = matrix
        .control_levels()
        .iter()
        .map(ToString::to_string)
        .collect();
    let first = label_width(rows.iter());
    let cell = label_width(cols.iter()).max(6);

    let _ = write!(out, "  {:first$}", "");
    for c in &cols {
        let _ = write!(out, "  {c:>cell$}");
    }
    out.push('\n');
    for (label, key) in rows.iter().zip(matrix.sensitive_levels()) {
        let _ = write!(out, "  {label:<first$}");
        for mean in matrix.row(key) {
            let text = mean.map_or_else(|| "-".to_string(), |m| format!("{m:.4}"));
            let _ = write!(out, "  {text:>cell$}");
        }
        out.push('\n');
    }
    out
}

/// TPR / FPR per group followed by the gap summary.
pub fn render_performance(analysis: &PerformanceAnalysis) -> String {
    let metrics = &analysis.metrics;
    let mut out = format!(
        "Performance parity of '{}' by '{}'\n",
        analysis.prediction_column, analysis.sensitive_column
    );
    let labels: Vec<String> = metrics.iter().map(|(k, _)| k.to_string()).collect();
    let width = label_width(labels.iter());
    for (label, (_, rates)) in labels.iter().zip(metrics.iter()) {
        let _ = writeln!(
            out,
            "  {label:<width$}  TPR {:>6}  FPR {:>6}  (pos {}, neg {})",
            rate(rates.tpr),
            rate(rates.fpr),
            rates.positives,
            rates.negatives
        );
    }
    let _ = writeln!(
        out,
        "  equal opportunity gap {}, equalized odds gap {}",
        rate(metrics.tpr_gap()),
        rate(metrics.equalized_odds_gap())
    );
    out
}

/// Full human-readable report.
pub fn render_report(report: &FairnessReport) -> String {
    let mut out = format!(
        "Target '{}' == {} over {} rows\n\n",
        report.target_column, report.target_value, report.rows
    );

    for column in &report.columns {
        match column {
            ColumnParity::Evaluated { column, report } => {
                out.push_str(&render_parity(column, report));
            }
            ColumnParity::Missing { column } => {
                let _ = writeln!(out, "Sensitive column '{column}' not found in the dataset.");
            }
        }
        out.push('\n');
    }

    if let Some(conditional) = &report.conditional {
        out.push_str(&render_conditional(conditional));
        out.push('\n');
    }
    if let Some(performance) = &report.performance {
        out.push_str(&render_performance(performance));
        out.push('\n');
    }

    // Missing sensitive columns were already reported in place.
    for diagnostic in report
        .diagnostics
        .iter()
        .filter(|d| d.role != ColumnRole::Sensitive)
    {
        let _ = writeln!(out, "note: {diagnostic}");
    }

    let unfair: Vec<&str> = report.unfair_columns().collect();
    if unfair.is_empty() {
        out.push_str("Result: all evaluated columns are fair\n");
    } else {
        let _ = writeln!(out, "Result: unfair columns: {}", unfair.join(", "));
    }
    out
}
