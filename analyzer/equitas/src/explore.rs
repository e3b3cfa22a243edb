//! Quick look at a dataset before choosing columns to analyze.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use equitas_table::{GroupKey, Table, TableError, Value};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub name: String,
    pub nulls: usize,
    pub distinct: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueCount {
    pub value: Value,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub rows: usize,
    pub columns: Vec<ColumnSummary>,
    /// Occurrences of each target value, nulls first, then in group order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_counts: Option<Vec<ValueCount>>,
}

/// Identity of a cell for counting. `1` and `1.0` are one value, `1` and
/// `"1"` are two.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum CountKey {
    Null,
    Group(GroupKey),
    List(String),
}

impl CountKey {
    fn of(column: &str, value: &Value) -> Self {
        match GroupKey::from_cell(column, value) {
            Ok(None) => CountKey::Null,
            Ok(Some(key)) => CountKey::Group(key),
            Err(_) => CountKey::List(value.to_string()),
        }
    }
}

fn count_values<'a>(
    column: &str,
    values: impl Iterator<Item = &'a Value>,
) -> BTreeMap<CountKey, ValueCount> {
    let mut counts = BTreeMap::new();
    for value in values {
        counts
            .entry(CountKey::of(column, value))
            .or_insert_with(|| ValueCount {
                value: value.clone(),
                count: 0,
            })
            .count += 1;
    }
    counts
}

pub fn summarize(table: &Table, target: Option<&str>) -> Result<DatasetSummary, TableError> {
    let mut columns = Vec::with_capacity(table.columns().len());
    for name in table.columns() {
        let counts = count_values(name, table.column(name)?);
        let nulls = counts.get(&CountKey::Null).map_or(0, |c| c.count);
        let distinct = counts.len() - usize::from(nulls > 0);
        columns.push(ColumnSummary {
            name: name.clone(),
            nulls,
            distinct,
        });
    }

    let target_counts = target
        .map(|column| -> Result<_, TableError> {
            Ok(count_values(column, table.column(column)?)
                .into_values()
                .collect())
        })
        .transpose()?;

    Ok(DatasetSummary {
        rows: table.len(),
        columns,
        target_counts,
    })
}

impl DatasetSummary {
    pub fn render(&self) -> String {
        let mut out = format!("{} rows, {} columns\n", self.rows, self.columns.len());
        let width = self
            .columns
            .iter()
            .map(|c| c.name.chars().count())
            .max()
            .unwrap_or(0);
        for c in &self.columns {
            let _ = writeln!(
                out,
                "  {:<width$}  {} distinct, {} null",
                c.name, c.distinct, c.nulls
            );
        }
        if let Some(counts) = &self.target_counts {
            out.push_str("target values:\n");
            for ValueCount { value, count } in counts {
                // Quote text so "1" is not mistaken for 1.
                match value {
                    Value::Str(s) => {
                        let _ = writeln!(out, "  {s:?}: {count}");
                    }
                    other => {
                        let _ = writeln!(out, "  {other}: {count}");
                    }
                }
            }
        }
        out
    }
}
