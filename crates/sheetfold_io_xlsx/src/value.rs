//! Caller-facing value model: nested records in, scalar cells out.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime, TimeZone};
use indexmap::IndexMap;

/// Ordered field name -> value mapping.
pub type Record = IndexMap<String, Value>;

/// Capability of structured leaf types (dates, money, ...) to present
/// themselves as a [`Record`] of public fields.
///
/// The returned order must be deterministic: it becomes the column order.
pub trait ExposeFields: fmt::Debug + Send + Sync {
    fn expose_fields(&self) -> Record;
}

/// Nested, heterogeneous input value.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Record(Record),
    Sequence(Vec<Value>),
    /// Structured value coerced to a record on traversal.
    Object(Arc<dyn ExposeFields>),
    /// Handle with no scalar or structural reading; the payload names its kind.
    Opaque(String),
}

impl Value {
    /// Wrap any field-exposing value.
    pub fn object(value: impl ExposeFields + 'static) -> Self {
        Value::Object(Arc::new(value))
    }

    /// Type name used in error messages.
    pub fn kind_name(&self) -> &str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "double",
            Value::String(_) => "string",
            Value::Record(_) | Value::Sequence(_) => "array",
            Value::Object(_) => "object",
            Value::Opaque(kind) => kind,
        }
    }

    /// Scalar view of a leaf, `None` for structures and opaque handles.
    pub fn as_scalar(&self) -> Option<Scalar> {
        match self {
            Value::Null => Some(Scalar::Null),
            Value::Bool(val) => Some(Scalar::Bool(*val)),
            Value::Int(val) => Some(Scalar::Int(*val)),
            Value::Float(val) => Some(Scalar::Float(*val)),
            Value::String(val) => Some(Scalar::String(val.clone())),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Record> for Value {
    fn from(value: Record) -> Self {
        Value::Record(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Sequence(value)
    }
}

impl From<Scalar> for Value {
    fn from(value: Scalar) -> Self {
        match value {
            Scalar::Null => Value::Null,
            Scalar::Bool(val) => Value::Bool(val),
            Scalar::Int(val) => Value::Int(val),
            Scalar::Float(val) => Value::Float(val),
            Scalar::String(val) => Value::String(val),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(val) => Value::Bool(val),
            serde_json::Value::Number(num) => match num.as_i64() {
                Some(val) => Value::Int(val),
                None => Value::Float(num.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(val) => Value::String(val),
            serde_json::Value::Array(items) => {
                Value::Sequence(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Record(
                map.into_iter()
                    .map(|(key, val)| (key, Value::from(val)))
                    .collect(),
            ),
        }
    }
}

/// Cell-level value: the only thing that survives the round trip.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl Scalar {
    /// Null or empty string.
    pub fn is_blank(&self) -> bool {
        match self {
            Scalar::Null => true,
            Scalar::String(val) => val.is_empty(),
            _ => false,
        }
    }

    /// Text form used for header labels.
    pub fn to_text(&self) -> String {
        match self {
            Scalar::Null => String::new(),
            Scalar::Bool(val) => if *val { "1" } else { "0" }.to_string(),
            Scalar::Int(val) => val.to_string(),
            Scalar::Float(val) => val.to_string(),
            Scalar::String(val) => val.clone(),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Scalar::Null => serde_json::Value::Null,
            Scalar::Bool(val) => serde_json::Value::Bool(*val),
            Scalar::Int(val) => serde_json::Value::from(*val),
            Scalar::Float(val) => serde_json::Number::from_f64(*val)
                .map(serde_json::Value::Number)
                .unwrap_or_else(|| serde_json::Value::String(val.to_string())),
            Scalar::String(val) => serde_json::Value::String(val.clone()),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::String(value.to_string())
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}

////////////////////////////////////////////////////////////////////////////////
// #region DateTimeFields

const C_FMT_DATE_FIELD: &str = "%Y-%m-%d %H:%M:%S%.6f";

impl<Tz> ExposeFields for DateTime<Tz>
where
    Tz: TimeZone + fmt::Debug + Send + Sync,
    Tz::Offset: fmt::Display + Send + Sync,
{
    fn expose_fields(&self) -> Record {
        let c_timezone = self.offset().to_string();
        // 1 = UTC offset, 3 = named zone
        let n_timezone_type = if c_timezone.starts_with(['+', '-']) { 1 } else { 3 };

        let mut dict_fields = Record::new();
        dict_fields.insert(
            "date".to_string(),
            Value::String(self.format(C_FMT_DATE_FIELD).to_string()),
        );
        dict_fields.insert("timezone_type".to_string(), Value::Int(n_timezone_type));
        dict_fields.insert("timezone".to_string(), Value::String(c_timezone));
        dict_fields
    }
}

impl ExposeFields for NaiveDateTime {
    fn expose_fields(&self) -> Record {
        let mut dict_fields = Record::new();
        dict_fields.insert(
            "date".to_string(),
            Value::String(self.format(C_FMT_DATE_FIELD).to_string()),
        );
        dict_fields
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
