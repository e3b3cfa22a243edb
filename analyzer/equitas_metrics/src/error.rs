use equitas_table::TableError;

/// Errors surfaced by the fairness evaluators.
///
/// Empty groups and empty tables are not errors; they resolve to defined
/// values (proportion 0, a vacuous verdict, or an undefined rate).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FairnessError {
    #[error("column '{column}' not found")]
    ColumnNotFound { column: String },

    #[error("column '{column}' holds a {found} value where a {expected} is required")]
    TypeMismatch {
        column: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("column '{column}' holds label {found}, expected 0 or 1")]
    InvalidLabel { column: String, found: String },

    #[error("fairness threshold {0} must be a finite value in [0, 1]")]
    InvalidThreshold(f64),

    #[error(transparent)]
    Table(TableError),
}

impl FairnessError {
    pub fn column_not_found(column: impl Into<String>) -> Self {
        FairnessError::ColumnNotFound {
            column: column.into(),
        }
    }
}

impl From<TableError> for FairnessError {
    fn from(err: TableError) -> Self {
        match err {
            TableError::ColumnNotFound(column) => FairnessError::ColumnNotFound { column },
            TableError::TypeMismatch {
                column,
                expected,
                found,
            } => FairnessError::TypeMismatch {
                column,
                expected,
                found,
            },
            other => FairnessError::Table(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, FairnessError>;
