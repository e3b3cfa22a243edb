//! Batch analysis over several sensitive columns.
//!
//! A sensitive column that is absent from the table yields a diagnostic for
//! that column only; the remaining columns are still evaluated. Every other
//! error aborts the batch.

use std::fmt;

use equitas_table::{Table, TableAccess, Value};
use serde::Serialize;

use crate::conditional::{conditional_parity, ConditionalMatrix};
use crate::error::{FairnessError, Result};
use crate::normalize::normalize_target;
use crate::parity::{ParityReport, StatisticalParity, DEFAULT_THRESHOLD};
use crate::performance::{performance_parity, PerformanceMetrics};

/// Outcome of the parity check for one sensitive column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ColumnParity {
    Evaluated {
        column: String,
        report: ParityReport,
    },
    /// The column does not exist in the table.
    Missing { column: String },
}

impl ColumnParity {
    pub fn column(&self) -> &str {
        match self {
            ColumnParity::Evaluated { column, .. } | ColumnParity::Missing { column } => column,
        }
    }

    pub fn report(&self) -> Option<&ParityReport> {
        match self {
            ColumnParity::Evaluated { report, .. } => Some(report),
            ColumnParity::Missing { .. } => None,
        }
    }

    pub fn is_fair(&self) -> Option<bool> {
        self.report().map(|r| r.verdict.fair)
    }
}

/// Run statistical parity for each of `sensitive_columns`, in order, with
/// the default threshold.
pub fn analyze<T, S>(
    table: &T,
    sensitive_columns: &[S],
    target_column: &str,
    target_value: &Value,
) -> Result<Vec<ColumnParity>>
where
    T: TableAccess,
    S: AsRef<str>,
{
    analyze_with(
        &StatisticalParity::default(),
        table,
        sensitive_columns,
        target_column,
        target_value,
    )
}

pub fn analyze_with<T, S>(
    parity: &StatisticalParity,
    table: &T,
    sensitive_columns: &[S],
    target_column: &str,
    target_value: &Value,
) -> Result<Vec<ColumnParity>>
where
    T: TableAccess,
    S: AsRef<str>,
{
    // A missing target is not a per-column condition.
    table.require_column(target_column)?;

    let mut out = Vec::with_capacity(sensitive_columns.len());
    for column in sensitive_columns {
        let column = column.as_ref();
        match parity.evaluate(table, column, target_column, target_value) {
            Ok(report) => out.push(ColumnParity::Evaluated {
                column: column.to_string(),
                report,
            }),
            Err(FairnessError::ColumnNotFound { column: missing }) if missing == column => {
                log::warn!("sensitive column '{column}' not found in the dataset");
                out.push(ColumnParity::Missing { column: missing });
            }
            Err(err) => return Err(err),
        }
    }
    Ok(out)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    Sensitive,
    Control,
    Prediction,
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnRole::Sensitive => write!(f, "sensitive"),
            ColumnRole::Control => write!(f, "control"),
            ColumnRole::Prediction => write!(f, "prediction"),
        }
    }
}

/// A requested column that was skipped because the table lacks it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub role: ColumnRole,
    pub column: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} column '{}' not found in the dataset",
            self.role, self.column
        )
    }
}

/// Everything an [`Analyzer`] run should compute.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub sensitive_columns: Vec<String>,
    pub target_column: String,
    pub target_value: Value,
    pub control_column: Option<String>,
    pub prediction_column: Option<String>,
    pub threshold: f64,
    /// Flatten list-valued target cells before evaluating.
    pub normalize_target: bool,
}

impl AnalysisRequest {
    pub fn new(
        sensitive_columns: Vec<String>,
        target_column: impl Into<String>,
        target_value: Value,
    ) -> Self {
        Self {
            sensitive_columns,
            target_column: target_column.into(),
            target_value,
            control_column: None,
            prediction_column: None,
            threshold: DEFAULT_THRESHOLD,
            normalize_target: true,
        }
    }

    pub fn with_control(mut self, column: impl Into<String>) -> Self {
        self.control_column = Some(column.into());
        self
    }

    pub fn with_prediction(mut self, column: impl Into<String>) -> Self {
        self.prediction_column = Some(column.into());
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionalAnalysis {
    pub sensitive_column: String,
    pub control_column: String,
    pub matrix: ConditionalMatrix,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceAnalysis {
    pub sensitive_column: String,
    pub prediction_column: String,
    pub metrics: PerformanceMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FairnessReport {
    pub target_column: String,
    pub target_value: Value,
    pub threshold: f64,
    pub rows: usize,
    pub columns: Vec<ColumnParity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditional: Option<ConditionalAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance: Option<PerformanceAnalysis>,
    pub diagnostics: Vec<Diagnostic>,
}

impl FairnessReport {
    /// True when every evaluated column passed. Missing columns do not count
    /// either way.
    pub fn all_fair(&self) -> bool {
        self.columns.iter().all(|c| c.is_fair().unwrap_or(true))
    }

    pub fn unfair_columns(&self) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .filter(|c| c.is_fair() == Some(false))
            .map(ColumnParity::column)
    }
}

/// Runs the full analysis described by an [`AnalysisRequest`].
///
/// The conditional and performance evaluators run on the first requested
/// sensitive column present in the table.
#[derive(Debug, Clone)]
pub struct Analyzer {
    request: AnalysisRequest,
    parity: StatisticalParity,
}

impl Analyzer {
    pub fn new(request: AnalysisRequest) -> Result<Self> {
        let parity = StatisticalParity::with_threshold(request.threshold)?;
        Ok(Self { request, parity })
    }

    pub fn request(&self) -> &AnalysisRequest {
        &self.request
    }

    pub fn run(&self, table: Table) -> Result<FairnessReport> {
        let req = &self.request;
        let table = if req.normalize_target {
            normalize_target(table, &req.target_column)?
        } else {
            table
        };
        log::info!(
            "analyzing {} rows: target '{}' == {}, {} sensitive column(s)",
            table.row_count(),
            req.target_column,
            req.target_value,
            req.sensitive_columns.len()
        );

        let columns = analyze_with(
            &self.parity,
            &table,
            &req.sensitive_columns,
            &req.target_column,
            &req.target_value,
        )?;

        let mut diagnostics: Vec<Diagnostic> = columns
            .iter()
            .filter(|c| matches!(c, ColumnParity::Missing { .. }))
            .map(|c| Diagnostic {
                role: ColumnRole::Sensitive,
                column: c.column().to_string(),
            })
            .collect();

        let primary = columns
            .iter()
            .find(|c| c.report().is_some())
            .map(|c| c.column().to_string());

        let mut conditional = None;
        let mut performance = None;
        if let Some(sensitive) = primary {
            let control = present_column(
                &table,
                &req.control_column,
                ColumnRole::Control,
                &mut diagnostics,
            );
            if let Some(control) = control {
                let matrix =
                    conditional_parity(&table, &sensitive, &req.target_column, &control)?;
                conditional = Some(ConditionalAnalysis {
                    sensitive_column: sensitive.clone(),
                    control_column: control,
                    matrix,
                });
            }
            let prediction = present_column(
                &table,
                &req.prediction_column,
                ColumnRole::Prediction,
                &mut diagnostics,
            );
            if let Some(prediction) = prediction {
                let metrics =
                    performance_parity(&table, &sensitive, &req.target_column, &prediction)?;
                performance = Some(PerformanceAnalysis {
                    sensitive_column: sensitive,
                    prediction_column: prediction,
                    metrics,
                });
            }
        } else if req.control_column.is_some() || req.prediction_column.is_some() {
            log::warn!("no sensitive column found; skipping conditional and performance analysis");
        }

        Ok(FairnessReport {
            target_column: req.target_column.clone(),
            target_value: req.target_value.clone(),
            threshold: self.parity.threshold(),
            rows: table.row_count(),
            columns,
            conditional,
            performance,
            diagnostics,
        })
    }
}

/// The requested column if the table has it; otherwise records a diagnostic.
fn present_column(
    table: &Table,
    column: &Option<String>,
    role: ColumnRole,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<String> {
    let column = column.as_ref()?;
    if table.has_column(column) {
        return Some(column.clone());
    }
    log::warn!("{role} column '{column}' not found in the dataset; skipping");
    diagnostics.push(Diagnostic {
        role,
        column: column.clone(),
    });
    None
}
