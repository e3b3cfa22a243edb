//! Statistical parity: does the target outcome occur at similar rates
//! across the groups of a sensitive column?

use std::collections::BTreeMap;

use equitas_table::{GroupKey, TableAccess, Value};
use serde::{Serialize, Serializer};

use crate::error::{FairnessError, Result};

/// Maximum tolerated spread between group proportions.
pub const DEFAULT_THRESHOLD: f64 = 0.1;

/// Share of rows per group whose target equals the requested value.
pub type GroupProportions = BTreeMap<GroupKey, f64>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FairnessVerdict {
    pub fair: bool,
    /// Max pairwise difference between group proportions. `None` when there
    /// were no groups to compare, which is distinct from a measured 0.
    pub disparity: Option<f64>,
    pub threshold: f64,
}

impl FairnessVerdict {
    /// Judge a proportion map. An empty map is vacuously fair but unmeasured.
    pub fn from_proportions(proportions: &GroupProportions, threshold: f64) -> Self {
        let disparity = disparity(proportions);
        FairnessVerdict {
            fair: disparity.map_or(true, |d| d <= threshold),
            disparity,
            threshold,
        }
    }

    pub fn is_measured(&self) -> bool {
        self.disparity.is_some()
    }
}

/// `max - min` over all proportions, `None` for an empty map.
pub fn disparity(proportions: &GroupProportions) -> Option<f64> {
    let mut values = proportions.values().copied();
    let first = values.next()?;
    let (lo, hi) = values.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));
    Some(hi - lo)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParityReport {
    #[serde(serialize_with = "serialize_proportions")]
    pub proportions: GroupProportions,
    pub verdict: FairnessVerdict,
}

/// `[{"group": .., "proportion": ..}]` in group order, each group with its
/// JSON type.
fn serialize_proportions<S: Serializer>(
    proportions: &GroupProportions,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    #[derive(Serialize)]
    struct Entry<'a> {
        group: &'a GroupKey,
        proportion: f64,
    }

    serializer.collect_seq(
        proportions
            .iter()
            .map(|(group, &proportion)| Entry { group, proportion }),
    )
}

/// Statistical parity evaluator with a configurable decision threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatisticalParity {
    threshold: f64,
}

impl Default for StatisticalParity {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl StatisticalParity {
    pub fn with_threshold(threshold: f64) -> Result<Self> {
        if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
            return Err(FairnessError::InvalidThreshold(threshold));
        }
        Ok(Self { threshold })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Proportion of rows with `target_column == target_value` per value of
    /// `sensitive_column`, plus the verdict on their spread.
    ///
    /// The denominator of each group is every row holding that sensitive
    /// value, whatever its target. Groups without rows (declared levels)
    /// report a proportion of 0 and take part in the disparity.
    pub fn evaluate<T: TableAccess>(
        &self,
        table: &T,
        sensitive_column: &str,
        target_column: &str,
        target_value: &Value,
    ) -> Result<ParityReport> {
        table.require_column(sensitive_column)?;
        table.require_column(target_column)?;

        let totals = table.group_count(sensitive_column, |_| true)?;
        let hits = table.group_count(sensitive_column, |row| {
            table
                .cell(row, target_column)
                .is_some_and(|v| v.matches(target_value))
        })?;

        let proportions: GroupProportions = totals
            .into_iter()
            .map(|(group, total)| {
                let hit = hits.get(&group).copied().unwrap_or(0);
                let p = if total == 0 {
                    0.0
                } else {
                    hit as f64 / total as f64
                };
                (group, p)
            })
            .collect();

        let verdict = FairnessVerdict::from_proportions(&proportions, self.threshold);
        if verdict.is_measured() {
            log::debug!(
                "statistical parity on '{sensitive_column}': {} groups, disparity {:.4}, fair={}",
                proportions.len(),
                verdict.disparity.unwrap_or_default(),
                verdict.fair
            );
        } else {
            log::debug!("statistical parity on '{sensitive_column}': no groups, vacuously fair");
        }

        Ok(ParityReport {
            proportions,
            verdict,
        })
    }
}

/// [`StatisticalParity::evaluate`] with the default threshold.
pub fn statistical_parity<T: TableAccess>(
    table: &T,
    sensitive_column: &str,
    target_column: &str,
    target_value: &Value,
) -> Result<ParityReport> {
    StatisticalParity::default().evaluate(table, sensitive_column, target_column, target_value)
}
