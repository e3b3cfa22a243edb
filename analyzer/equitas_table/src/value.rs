//! Cell values and the hashable keys used to group rows.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::TableError;

/// A single table cell.
///
/// The derived `PartialEq` is structural (`Int(1) != Float(1.0)`); use
/// [`Value::matches`] for the comparison the evaluators apply to data.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view of `Int` and `Float` cells.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(x) => Some(*x),
            _ => None,
        }
    }

    /// Short name of the variant, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::List(_) => "list",
        }
    }

    /// Data equality: numbers compare by value across `Int`/`Float`, every
    /// other pairing must share a variant, and `Null` matches nothing.
    ///
    /// ```
    /// use equitas_table::Value;
    /// assert!(Value::Int(1).matches(&Value::Float(1.0)));
    /// assert!(!Value::Int(1).matches(&Value::Str("1".into())));
    /// assert!(!Value::Null.matches(&Value::Null));
    /// ```
    pub fn matches(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, _) | (_, Value::Null) => false,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
                self.as_number() == other.as_number()
            }
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.matches(y))
            }
            _ => false,
        }
    }

    /// Interpret a user-supplied literal: integer, then float, then boolean,
    /// then `null`, falling back to a string.
    pub fn parse_literal(text: &str) -> Value {
        let t = text.trim();
        if let Ok(n) = t.parse::<i64>() {
            return Value::Int(n);
        }
        if let Ok(x) = t.parse::<f64>() {
            if x.is_finite() {
                return Value::Float(x);
            }
        }
        match t {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            "null" => Value::Null,
            _ => Value::Str(t.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Scalar identity of a group (a sensitive or control value).
///
/// Integral floats collapse to `Int`, so `1` and `1.0` land in one group.
/// Keys are totally ordered: booleans, then numbers by value, then strings.
#[derive(Debug, Clone)]
pub enum GroupKey {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl GroupKey {
    /// Key for a grouping cell. `Null` cells belong to no group; list cells
    /// cannot be grouped.
    pub fn from_cell(column: &str, value: &Value) -> Result<Option<GroupKey>, TableError> {
        let key = match value {
            Value::Null => return Ok(None),
            Value::Bool(b) => GroupKey::Bool(*b),
            Value::Int(n) => GroupKey::Int(*n),
            Value::Float(x) => Self::from_float(*x),
            Value::Str(s) => GroupKey::Str(s.clone()),
            Value::List(_) => {
                return Err(TableError::TypeMismatch {
                    column: column.to_string(),
                    expected: "scalar",
                    found: value.type_name(),
                })
            }
        };
        Ok(Some(key))
    }

    fn from_float(x: f64) -> GroupKey {
        if x.fract() == 0.0 && x >= i64::MIN as f64 && x < i64::MAX as f64 {
            GroupKey::Int(x as i64)
        } else {
            GroupKey::Float(x)
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            GroupKey::Bool(b) => Value::Bool(*b),
            GroupKey::Int(n) => Value::Int(*n),
            GroupKey::Float(x) => Value::Float(*x),
            GroupKey::Str(s) => Value::Str(s.clone()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            GroupKey::Bool(_) => 0,
            GroupKey::Int(_) | GroupKey::Float(_) => 1,
            GroupKey::Str(_) => 2,
        }
    }
}

impl Ord for GroupKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (GroupKey::Bool(a), GroupKey::Bool(b)) => a.cmp(b),
            (GroupKey::Int(a), GroupKey::Int(b)) => a.cmp(b),
            (GroupKey::Float(a), GroupKey::Float(b)) => a.total_cmp(b),
            // Never equal: integral floats are stored as Int.
            (GroupKey::Int(a), GroupKey::Float(b)) => {
                (*a as f64).total_cmp(b).then(Ordering::Less)
            }
            (GroupKey::Float(a), GroupKey::Int(b)) => {
                a.total_cmp(&(*b as f64)).then(Ordering::Greater)
            }
            (GroupKey::Str(a), GroupKey::Str(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for GroupKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for GroupKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for GroupKey {}

impl Hash for GroupKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            GroupKey::Bool(b) => (0u8, b).hash(state),
            GroupKey::Int(n) => (1u8, n).hash(state),
            GroupKey::Float(x) => (2u8, x.to_bits()).hash(state),
            GroupKey::Str(s) => (3u8, s).hash(state),
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Bool(b) => write!(f, "{b}"),
            GroupKey::Int(n) => write!(f, "{n}"),
            GroupKey::Float(x) => write!(f, "{x}"),
            GroupKey::Str(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for GroupKey {
    fn from(s: &str) -> Self {
        GroupKey::Str(s.to_string())
    }
}

impl From<i64> for GroupKey {
    fn from(n: i64) -> Self {
        GroupKey::Int(n)
    }
}
