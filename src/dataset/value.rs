//! Scalar field values and records

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use super::kind::FieldType;

/// A record: field name to scalar value
pub type Record = HashMap<String, FieldValue>;

/// Largest integer an f64 holds exactly (2^53)
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// A scalar stored in a record field
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Num(f64),
    Str(String),
}

impl FieldValue {
    pub fn field_type(&self) -> FieldType {
        match self {
            FieldValue::Num(_) => FieldType::Number,
            FieldValue::Str(_) => FieldType::String,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Num(n) => Some(*n),
            FieldValue::Str(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Str(s) => Some(s),
            FieldValue::Num(_) => None,
        }
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Num(n)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Num(n as f64)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Str(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Str(s)
    }
}

// Integral numbers are written without a fractional part so that `year: 2017`
// comes back out as `2017`, not `2017.0`.
impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Num(n) if n.fract() == 0.0 && n.abs() < MAX_SAFE_INTEGER => {
                serializer.serialize_i64(*n as i64)
            }
            FieldValue::Num(n) => serializer.serialize_f64(*n),
            FieldValue::Str(s) => serializer.serialize_str(s),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Num(n) => write!(f, "{}", n),
            FieldValue::Str(s) => write!(f, "{}", s),
        }
    }
}

/// Builds a record from one snapshot entry.
///
/// Only string and number fields are kept. A non-object entry yields an
/// empty record, which no dataset kind accepts.
pub fn record_from_json(entry: &Value) -> Record {
    let Some(object) = entry.as_object() else {
        return Record::new();
    };
    object
        .iter()
        .filter_map(|(name, value)| {
            let value = match value {
                Value::String(s) => FieldValue::Str(s.clone()),
                Value::Number(n) => FieldValue::Num(n.as_f64()?),
                _ => return None,
            };
            Some((name.clone(), value))
        })
        .collect()
}
