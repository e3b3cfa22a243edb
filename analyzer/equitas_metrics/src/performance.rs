//! Performance parity: true and false positive rates of a classifier per
//! group (equality of opportunity and equalized odds).

use std::collections::BTreeMap;

use equitas_table::{GroupKey, TableAccess, Value};
use serde::{Serialize, Serializer};

use crate::error::{FairnessError, Result};

/// Confusion counts and rates for one group. A rate is `None` when its
/// denominator is zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct GroupRates {
    pub tpr: Option<f64>,
    pub fpr: Option<f64>,
    pub positives: usize,
    pub negatives: usize,
    pub true_positives: usize,
    pub false_positives: usize,
}

impl GroupRates {
    fn finish(mut self) -> Self {
        self.tpr = ratio(self.true_positives, self.positives);
        self.fpr = ratio(self.false_positives, self.negatives);
        self
    }
}

fn ratio(num: usize, den: usize) -> Option<f64> {
    (den > 0).then(|| num as f64 / den as f64)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PerformanceMetrics {
    groups: BTreeMap<GroupKey, GroupRates>,
}

/// One entry per group: `{"group": .., "tpr": .., ...}`.
impl Serialize for PerformanceMetrics {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Entry<'a> {
            group: &'a GroupKey,
            #[serde(flatten)]
            rates: &'a GroupRates,
        }

        serializer.collect_seq(self.groups.iter().map(|(group, rates)| Entry { group, rates }))
    }
}

impl PerformanceMetrics {
    pub fn get(&self, group: &GroupKey) -> Option<&GroupRates> {
        self.groups.get(group)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&GroupKey, &GroupRates)> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Equal-opportunity difference: spread of TPR over groups where it is
    /// defined.
    pub fn tpr_gap(&self) -> Option<f64> {
        spread(self.groups.values().filter_map(|r| r.tpr))
    }

    pub fn fpr_gap(&self) -> Option<f64> {
        spread(self.groups.values().filter_map(|r| r.fpr))
    }

    /// Equalized-odds difference: the larger of the TPR and FPR gaps.
    pub fn equalized_odds_gap(&self) -> Option<f64> {
        match (self.tpr_gap(), self.fpr_gap()) {
            (Some(t), Some(f)) => Some(t.max(f)),
            (t, f) => t.or(f),
        }
    }
}

fn spread(mut rates: impl Iterator<Item = f64>) -> Option<f64> {
    let first = rates.next()?;
    let (lo, hi) = rates.fold((first, first), |(lo, hi), r| (lo.min(r), hi.max(r)));
    Some(hi - lo)
}

/// Strict 0/1 label. `Ok(None)` for a null cell.
fn binary_label(column: &str, value: &Value) -> Result<Option<bool>> {
    match value {
        Value::Null => Ok(None),
        Value::Int(0) => Ok(Some(false)),
        Value::Int(1) => Ok(Some(true)),
        Value::Float(x) if *x == 0.0 => Ok(Some(false)),
        Value::Float(x) if *x == 1.0 => Ok(Some(true)),
        other => Err(FairnessError::InvalidLabel {
            column: column.to_string(),
            found: other.to_string(),
        }),
    }
}

/// TPR and FPR of `prediction_column` against `target_column` per value of
/// `sensitive_column`.
///
/// Rows with a null target are unlabeled and skipped. Any other target or
/// prediction value besides 0 and 1 is an [`FairnessError::InvalidLabel`];
/// booleans and strings are not coerced.
pub fn performance_parity<T: TableAccess>(
    table: &T,
    sensitive_column: &str,
    target_column: &str,
    prediction_column: &str,
) -> Result<PerformanceMetrics> {
    table.require_column(target_column)?;
    table.require_column(prediction_column)?;

    // Seeds every group (and declared level) with empty counts.
    let mut groups: BTreeMap<GroupKey, GroupRates> = table
        .group_count(sensitive_column, |_| false)?
        .into_keys()
        .map(|k| (k, GroupRates::default()))
        .collect();

    for row in 0..table.row_count() {
        let Some(group) = table.group_key(row, sensitive_column)? else {
            continue;
        };
        let target = table.cell(row, target_column).unwrap_or(&Value::Null);
        let Some(actual) = binary_label(target_column, target)? else {
            continue;
        };
        let prediction = table.cell(row, prediction_column).unwrap_or(&Value::Null);
        let predicted = binary_label(prediction_column, prediction)?.ok_or_else(|| {
            FairnessError::InvalidLabel {
                column: prediction_column.to_string(),
                found: Value::Null.to_string(),
            }
        })?;

        let rates = groups.entry(group).or_default();
        if actual {
            rates.positives += 1;
            rates.true_positives += usize::from(predicted);
        } else {
            rates.negatives += 1;
            rates.false_positives += usize::from(predicted);
        }
    }

    let metrics = PerformanceMetrics {
        groups: groups.into_iter().map(|(k, r)| (k, r.finish())).collect(),
    };
    for (group, rates) in metrics.iter() {
        log::debug!(
            "performance parity '{sensitive_column}'={group}: tpr={:?} fpr={:?}",
            rates.tpr,
            rates.fpr
        );
    }
    Ok(metrics)
}
