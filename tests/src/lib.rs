//! Shared fixtures for the scenario and property suites.

use equitas_table::{Table, Value};

pub const EPSILON: f64 = 1e-12;

pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

/// Columns `group` and `target`. Each `(name, rows, hits)` entry adds `rows`
/// rows for `name`, the first `hits` of them with target 1 and the rest 0.
pub fn grouped_table(groups: &[(&str, usize, usize)]) -> Table {
    let mut rows = Vec::new();
    for (name, total, hits) in groups {
        for i in 0..*total {
            rows.push(vec![Value::from(*name), Value::Int(i64::from(i < *hits))]);
        }
    }
    Table::from_rows(["group", "target"], rows).expect("fixture rows are rectangular")
}

/// Columns `group`, `label` and `pred` from `(group, label, prediction)`.
pub fn classifier_table(rows: &[(&str, i64, i64)]) -> Table {
    let rows = rows
        .iter()
        .map(|(g, y, p)| vec![Value::from(*g), Value::Int(*y), Value::Int(*p)])
        .collect();
    Table::from_rows(["group", "label", "pred"], rows).expect("fixture rows are rectangular")
}
