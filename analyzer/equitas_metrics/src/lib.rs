//! Group-fairness metric engine.
//!
//! Data flows from a [`Table`](equitas_table::Table) through the target
//! normalizer into three evaluators:
//!
//! - [`parity`]: statistical parity with a threshold verdict
//! - [`conditional`]: parity stratified by a control column
//! - [`performance`]: TPR / FPR per group
//!
//! The [`orchestrator`] runs parity over a list of sensitive columns and
//! delegates to the other evaluators on request. Every evaluator is a pure,
//! synchronous function over a read-only table.

pub mod conditional;
pub mod error;
pub mod normalize;
pub mod orchestrator;
pub mod parity;
pub mod performance;

pub use conditional::{conditional_parity, ConditionalCell, ConditionalMatrix};
pub use error::{FairnessError, Result};
pub use normalize::normalize_target;
pub use orchestrator::{
    analyze, analyze_with, AnalysisRequest, Analyzer, ColumnParity, ColumnRole,
    ConditionalAnalysis, Diagnostic, FairnessReport, PerformanceAnalysis,
};
pub use parity::{
    disparity, statistical_parity, FairnessVerdict, GroupProportions, ParityReport,
    StatisticalParity, DEFAULT_THRESHOLD,
};
pub use performance::{performance_parity, GroupRates, PerformanceMetrics};
