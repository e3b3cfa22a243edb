//! JSON interop: record conversion and `Serialize` impls.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value as JsonValue};

use crate::{GroupKey, Table, TableError, Value};

impl Value {
    /// Convert a JSON scalar or array. Nested objects have no cell form.
    pub fn from_json(json: JsonValue) -> Result<Value, TableError> {
        Ok(match json {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Bool(b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            JsonValue::String(s) => Value::Str(s),
            JsonValue::Array(items) => Value::List(
                items
                    .into_iter()
                    .map(Value::from_json)
                    .collect::<Result<_, _>>()?,
            ),
            JsonValue::Object(_) => {
                return Err(TableError::UnsupportedValue(
                    "nested objects cannot be stored in a cell".to_string(),
                ))
            }
        })
    }
}

impl Table {
    /// Build a table from JSON objects. The column set is the union of all
    /// keys in first-seen order; keys a record lacks are filled with null.
    pub fn from_records(records: Vec<Map<String, JsonValue>>) -> Result<Table, TableError> {
        let mut columns: Vec<String> = Vec::new();
        for record in &records {
            for key in record.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }

        let mut table = Table::new(columns.clone())?;
        for mut record in records {
            let row = columns
                .iter()
                .map(|c| record.remove(c).map_or(Ok(Value::Null), Value::from_json))
                .collect::<Result<Vec<_>, _>>()?;
            table.push_row(row)?;
        }
        Ok(table)
    }

    /// Build a table from a JSON array of objects.
    pub fn from_json(json: JsonValue) -> Result<Table, TableError> {
        let JsonValue::Array(items) = json else {
            return Err(TableError::UnsupportedValue(
                "expected a JSON array of records".to_string(),
            ));
        };
        let records = items
            .into_iter()
            .enumerate()
            .map(|(i, item)| match item {
                JsonValue::Object(map) => Ok(map),
                other => Err(TableError::UnsupportedValue(format!(
                    "record {i} is not an object: {other}"
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Table::from_records(records)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(n) => serializer.serialize_i64(*n),
            Value::Float(x) => serializer.serialize_f64(*x),
            Value::Str(s) => serializer.serialize_str(s),
            Value::List(items) => serializer.collect_seq(items),
        }
    }
}

/// Group keys keep their JSON type, so `1` and `"1"` stay apart. Reports
/// list groups as entries rather than using keys as object keys.
impl Serialize for GroupKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            GroupKey::Bool(b) => serializer.serialize_bool(*b),
            GroupKey::Int(n) => serializer.serialize_i64(*n),
            GroupKey::Float(x) => serializer.serialize_f64(*x),
            GroupKey::Str(s) => serializer.serialize_str(s),
        }
    }
}
