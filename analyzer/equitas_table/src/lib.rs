//! Tabular data model for the equitas fairness analyzer.
//!
//! - [`Value`]: a cell (number, string, boolean, null, or a small list)
//! - [`GroupKey`]: the hashable scalar a grouping column partitions rows by
//! - [`Table`]: an in-memory, row-major table with optional declared levels
//! - [`TableAccess`]: the read-only contract the evaluators consume, with
//!   grouped count and grouped mean aggregations

pub mod access;
pub mod error;
#[cfg(feature = "serde")]
pub mod json;
pub mod table;
pub mod value;

pub use access::{GroupCounts, GroupMean, GroupMeans, TableAccess};
pub use error::TableError;
pub use table::Table;
pub use value::{GroupKey, Value};
