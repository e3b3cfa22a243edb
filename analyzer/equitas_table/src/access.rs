//! Read-only access contract consumed by the fairness evaluators.
//!
//! Implementors supply column lookup and cell access; the grouped
//! aggregations are provided on top of those.

use std::collections::BTreeMap;

use crate::{GroupKey, Table, TableError, Value};

/// Row count per group, in ascending key order.
pub type GroupCounts = BTreeMap<GroupKey, usize>;

/// Mean of a value column over the rows of one `(row key, column key)` cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupMean {
    pub mean: f64,
    /// Number of non-null observations averaged.
    pub count: usize,
}

pub type GroupMeans = BTreeMap<(GroupKey, GroupKey), GroupMean>;

pub trait TableAccess {
    fn column_names(&self) -> &[String];

    fn row_count(&self) -> usize;

    /// Cell at `row` in `column`; `None` if either is out of range.
    fn cell(&self, row: usize, column: &str) -> Option<&Value>;

    /// Declared categorical levels of `column` (possibly without rows).
    fn declared_levels(&self, _column: &str) -> &[Value] {
        &[]
    }

    fn has_column(&self, column: &str) -> bool {
        self.column_names().iter().any(|c| c == column)
    }

    fn require_column(&self, column: &str) -> Result<(), TableError> {
        if self.has_column(column) {
            Ok(())
        } else {
            Err(TableError::ColumnNotFound(column.to_string()))
        }
    }

    /// Group key of `row` in `column`; `None` for a null cell.
    fn group_key(&self, row: usize, column: &str) -> Result<Option<GroupKey>, TableError> {
        match self.cell(row, column) {
            Some(value) => GroupKey::from_cell(column, value),
            None => Err(TableError::ColumnNotFound(column.to_string())),
        }
    }

    /// Count rows per distinct non-null value of `column` among rows where
    /// `predicate(row)` holds. Every group present in the column (and every
    /// declared level) appears in the result, with 0 when no row passes.
    fn group_count<P>(&self, column: &str, mut predicate: P) -> Result<GroupCounts, TableError>
    where
        P: FnMut(usize) -> bool,
    {
        self.require_column(column)?;
        let mut counts = GroupCounts::new();
        for level in self.declared_levels(column) {
            if let Some(key) = GroupKey::from_cell(column, level)? {
                counts.entry(key).or_insert(0);
            }
        }
        for row in 0..self.row_count() {
            let Some(key) = self.group_key(row, column)? else {
                continue;
            };
            let count = counts.entry(key).or_insert(0);
            if predicate(row) {
                *count += 1;
            }
        }
        Ok(counts)
    }

    /// Mean of `value_column` per non-empty `(row_key, col_key)` cell.
    ///
    /// Numbers average as-is and booleans as 0/1; null values are skipped.
    /// A cell with no non-null observation is absent from the result.
    fn group_mean(
        &self,
        row_key: &str,
        col_key: &str,
        value_column: &str,
    ) -> Result<GroupMeans, TableError> {
        self.require_column(row_key)?;
        self.require_column(col_key)?;
        self.require_column(value_column)?;

        let mut sums: BTreeMap<(GroupKey, GroupKey), (f64, usize)> = BTreeMap::new();
        for row in 0..self.row_count() {
            let (Some(r), Some(c)) = (self.group_key(row, row_key)?, self.group_key(row, col_key)?)
            else {
                continue;
            };
            let x = match self.cell(row, value_column) {
                Some(Value::Null) | None => continue,
                Some(Value::Bool(b)) => f64::from(u8::from(*b)),
                Some(v) => v.as_number().ok_or_else(|| TableError::TypeMismatch {
                    column: value_column.to_string(),
                    expected: "number",
                    found: v.type_name(),
                })?,
            };
            let entry = sums.entry((r, c)).or_insert((0.0, 0));
            entry.0 += x;
            entry.1 += 1;
        }

        Ok(sums
            .into_iter()
            .map(|(key, (sum, count))| {
                (
                    key,
                    GroupMean {
                        mean: sum / count as f64,
                        count,
                    },
                )
            })
            .collect())
    }
}

impl TableAccess for Table {
    fn column_names(&self) -> &[String] {
        self.columns()
    }

    fn row_count(&self) -> usize {
        self.len()
    }

    fn cell(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column).ok()?;
        self.row(row).map(|cells| &cells[idx])
    }

    fn declared_levels(&self, column: &str) -> &[Value] {
        self.levels(column)
    }

    fn has_column(&self, column: &str) -> bool {
        self.column_index(column).is_ok()
    }
}
