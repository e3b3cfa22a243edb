use std::collections::HashMap;

use crate::{TableError, Value};

/// Row-major, in-memory table. Every row has one cell per column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Vec<Value>>,
    // Declared categorical domain per column; levels may have no rows.
    levels: HashMap<String, Vec<Value>>,
}

impl Table {
    /// Create an empty table with the given columns.
    pub fn new<I, S>(columns: I) -> Result<Self, TableError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Table::default();
        for name in columns {
            let name = name.into();
            if table.index.contains_key(&name) {
                return Err(TableError::DuplicateColumn(name));
            }
            table.index.insert(name.clone(), table.columns.len());
            table.columns.push(name);
        }
        Ok(table)
    }

    pub fn from_rows<I, S>(columns: I, rows: Vec<Vec<Value>>) -> Result<Self, TableError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self::new(columns)?;
        table.rows.reserve(rows.len());
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    pub fn push_row(&mut self, row: Vec<Value>) -> Result<(), TableError> {
        if row.len() != self.columns.len() {
            return Err(TableError::RaggedRow {
                row: self.rows.len(),
                expected: self.columns.len(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Declare the full set of levels a column can take, including levels
    /// that no row currently holds.
    pub fn with_levels(mut self, column: &str, levels: Vec<Value>) -> Result<Self, TableError> {
        self.column_index(column)?;
        self.levels.insert(column.to_string(), levels);
        Ok(self)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Result<usize, TableError> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| TableError::ColumnNotFound(name.to_string()))
    }

    pub fn row(&self, index: usize) -> Option<&[Value]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Value]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Cells of one column, top to bottom.
    pub fn column(&self, name: &str) -> Result<impl Iterator<Item = &Value>, TableError> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(move |row| &row[idx]))
    }

    pub fn levels(&self, column: &str) -> &[Value] {
        self.levels.get(column).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Replace every cell of `column` with `f(cell)`.
    pub fn map_column<F>(&mut self, column: &str, mut f: F) -> Result<(), TableError>
    where
        F: FnMut(Value) -> Value,
    {
        let idx = self.column_index(column)?;
        for row in &mut self.rows {
            let cell = std::mem::take(&mut row[idx]);
            row[idx] = f(cell);
        }
        Ok(())
    }
}
