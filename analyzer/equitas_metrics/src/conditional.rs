//! Conditional statistical parity: target rates stratified by a control
//! column. A reporting aid only; it carries no verdict.

use std::collections::{BTreeMap, BTreeSet};

use equitas_table::{GroupKey, TableAccess};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConditionalCell {
    pub mean: f64,
    /// Observations behind `mean`.
    pub rows: usize,
}

/// Mean target per `(sensitive value, control value)` pair. Pairs without
/// observations are absent, never reported as 0.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConditionalMatrix {
    sensitive_levels: Vec<GroupKey>,
    control_levels: Vec<GroupKey>,
    cells: BTreeMap<(GroupKey, GroupKey), ConditionalCell>,
}

impl ConditionalMatrix {
    fn from_cells(cells: BTreeMap<(GroupKey, GroupKey), ConditionalCell>) -> Self {
        let mut sensitive = BTreeSet::new();
        let mut control = BTreeSet::new();
        for (s, c) in cells.keys() {
            sensitive.insert(s.clone());
            control.insert(c.clone());
        }
        ConditionalMatrix {
            sensitive_levels: sensitive.into_iter().collect(),
            control_levels: control.into_iter().collect(),
            cells,
        }
    }

    pub fn sensitive_levels(&self) -> &[GroupKey] {
        &self.sensitive_levels
    }

    pub fn control_levels(&self) -> &[GroupKey] {
        &self.control_levels
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cell(&self, sensitive: &GroupKey, control: &GroupKey) -> Option<&ConditionalCell> {
        self.cells.get(&(sensitive.clone(), control.clone()))
    }

    pub fn get(&self, sensitive: &GroupKey, control: &GroupKey) -> Option<f64> {
        self.cell(sensitive, control).map(|c| c.mean)
    }

    pub fn cells(&self) -> impl Iterator<Item = (&GroupKey, &GroupKey, &ConditionalCell)> {
        self.cells.iter().map(|((s, c), cell)| (s, c, cell))
    }

    /// One matrix row, aligned with [`control_levels`](Self::control_levels).
    pub fn row(&self, sensitive: &GroupKey) -> Vec<Option<f64>> {
        self.control_levels
            .iter()
            .map(|c| self.get(sensitive, c))
            .collect()
    }

    /// Spread (max - min) of the means across sensitive levels within one
    /// control stratum; `None` when the stratum has no populated cell.
    pub fn stratum_spread(&self, control: &GroupKey) -> Option<f64> {
        let mut means = self
            .sensitive_levels
            .iter()
            .filter_map(|s| self.get(s, control));
        let first = means.next()?;
        let (lo, hi) = means.fold((first, first), |(lo, hi), m| (lo.min(m), hi.max(m)));
        Some(hi - lo)
    }
}

impl Serialize for ConditionalMatrix {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Entry<'a> {
            sensitive: &'a GroupKey,
            control: &'a GroupKey,
            mean: f64,
            rows: usize,
        }

        let entries: Vec<Entry<'_>> = self
            .cells()
            .map(|(sensitive, control, cell)| Entry {
                sensitive,
                control,
                mean: cell.mean,
                rows: cell.rows,
            })
            .collect();

        let mut st = serializer.serialize_struct("ConditionalMatrix", 3)?;
        st.serialize_field("sensitive_levels", &self.sensitive_levels)?;
        st.serialize_field("control_levels", &self.control_levels)?;
        st.serialize_field("cells", &entries)?;
        st.end()
    }
}

/// Mean of `target_column` per `(sensitive_column, control_column)` pair.
///
/// The target must be numeric or boolean; with a 0/1 target each mean is the
/// positive rate of its stratum.
pub fn conditional_parity<T: TableAccess>(
    table: &T,
    sensitive_column: &str,
    target_column: &str,
    control_column: &str,
) -> Result<ConditionalMatrix> {
    let means = table.group_mean(sensitive_column, control_column, target_column)?;
    let cells = means
        .into_iter()
        .map(|(key, m)| {
            (
                key,
                ConditionalCell {
                    mean: m.mean,
                    rows: m.count,
                },
            )
        })
        .collect();
    let matrix = ConditionalMatrix::from_cells(cells);
    log::debug!(
        "conditional parity '{sensitive_column}' x '{control_column}': {} of {} cells populated",
        matrix.len(),
        matrix.sensitive_levels.len() * matrix.control_levels.len()
    );
    Ok(matrix)
}
