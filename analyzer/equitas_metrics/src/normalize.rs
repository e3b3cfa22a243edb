//! Flattening of list-valued target cells.

use equitas_table::{Table, Value};

use crate::error::Result;

/// Make every cell of `target_column` a scalar: a list becomes its first
/// element, or null when empty. Scalars pass through unchanged.
pub fn normalize_target(mut table: Table, target_column: &str) -> Result<Table> {
    let mut flattened = 0usize;
    table.map_column(target_column, |cell| match cell {
        Value::List(items) => {
            flattened += 1;
            items.into_iter().next().unwrap_or(Value::Null)
        }
        other => other,
    })?;
    if flattened > 0 {
        log::debug!("normalized {flattened} list cells in target column '{target_column}'");
    }
    Ok(table)
}
