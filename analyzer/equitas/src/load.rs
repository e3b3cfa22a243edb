//! Dataset loading from JSON and CSV files.
//!
//! Three layouts are understood: a single JSON array of records (`.json`),
//! newline-delimited records (`.ndjson`, `.jsonl`) and comma-separated rows
//! with a header line (`.csv`). Any other extension is sniffed from the first
//! non-blank character as one of the two JSON layouts.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use equitas_table::{Table, TableError, Value};
use serde_json::Value as JsonValue;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid JSON at line {line}: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid CSV at line {line}: {source}")]
    Csv {
        line: usize,
        #[source]
        source: csv::Error,
    },
    #[error("line {line}: expected a JSON object, found {found}")]
    NotARecord { line: usize, found: String },
    #[error("line {line}: {source}")]
    Record {
        line: usize,
        #[source]
        source: TableError,
    },
    #[error(transparent)]
    Table(#[from] TableError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    JsonArray,
    Ndjson,
    Csv,
}

impl DataFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(DataFormat::JsonArray),
            "ndjson" | "jsonl" => Some(DataFormat::Ndjson),
            "csv" => Some(DataFormat::Csv),
            _ => None,
        }
    }

    fn sniff(text: &str) -> Self {
        match text.trim_start().chars().next() {
            Some('[') => DataFormat::JsonArray,
            _ => DataFormat::Ndjson,
        }
    }
}

/// Read and parse a dataset file.
pub fn load_table(path: &Path) -> Result<Table, LoadError> {
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let format = DataFormat::from_path(path).unwrap_or_else(|| DataFormat::sniff(&text));
    log::debug!("loading '{}' as {format:?}", path.display());
    let table = parse_table(&text, format)?;
    log::info!(
        "loaded {} rows x {} columns from '{}'",
        table.len(),
        table.columns().len(),
        path.display()
    );
    Ok(table)
}

pub fn parse_table(text: &str, format: DataFormat) -> Result<Table, LoadError> {
    match format {
        DataFormat::JsonArray => parse_json_array(text),
        DataFormat::Ndjson => parse_ndjson(text),
        DataFormat::Csv => parse_csv(text),
    }
}

pub fn parse_json_array(text: &str) -> Result<Table, LoadError> {
    let json: JsonValue = serde_json::from_str(text).map_err(|source| LoadError::Json {
        line: source.line(),
        source,
    })?;
    Ok(Table::from_json(json)?)
}

/// One record per line; blank lines are skipped. Line numbers in errors are
/// 1-based.
pub fn parse_ndjson(text: &str) -> Result<Table, LoadError> {
    let mut records: Vec<Vec<(String, Value)>> = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let line_no = i + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let json: JsonValue = serde_json::from_str(trimmed).map_err(|source| LoadError::Json {
            line: line_no,
            source,
        })?;
        let map = match json {
            JsonValue::Object(map) => map,
            other => {
                return Err(LoadError::NotARecord {
                    line: line_no,
                    found: json_kind(&other).to_string(),
                })
            }
        };
        let record = map
            .into_iter()
            .map(|(key, value)| Value::from_json(value).map(|value| (key, value)))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| LoadError::Record {
                line: line_no,
                source,
            })?;
        records.push(record);
    }
    table_from_records(records)
}

/// Column set is the union of record keys in first-seen order; absent keys
/// are null.
fn table_from_records(records: Vec<Vec<(String, Value)>>) -> Result<Table, LoadError> {
    let mut columns: Vec<String> = Vec::new();
    for record in &records {
        for (key, _) in record {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }

    let width = columns.len();
    let mut table = Table::new(columns)?;
    for record in records {
        let mut row = vec![Value::Null; width];
        for (key, value) in record {
            row[table.column_index(&key)?] = value;
        }
        table.push_row(row)?;
    }
    Ok(table)
}

/// The first row names the columns. Each field is typed the way a literal on
/// the command line is; an empty field is null.
pub fn parse_csv(text: &str) -> Result<Table, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());
    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(str::to_string)
        .collect();

    let mut table = Table::new(headers)?;
    for result in reader.records() {
        let record = result.map_err(csv_error)?;
        let line = record.position().map_or(0, |p| p.line() as usize);
        let row = record.iter().map(csv_cell).collect();
        table
            .push_row(row)
            .map_err(|source| LoadError::Record { line, source })?;
    }
    Ok(table)
}

fn csv_cell(field: &str) -> Value {
    if field.is_empty() {
        Value::Null
    } else {
        Value::parse_literal(field)
    }
}

fn csv_error(source: csv::Error) -> LoadError {
    let line = source.position().map_or(0, |p| p.line() as usize);
    LoadError::Csv { line, source }
}

fn json_kind(json: &JsonValue) -> &'static str {
    match json {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}
