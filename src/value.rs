//! Native values exchanged with callers.
//!
//! The remote API speaks JSON (see [`serde_json::Value`], the *wire value*). Callers work
//! with [`Value`], which additionally knows about dates, raw bytes and collection
//! operations. The type system (`crate::types`) converts between the two using field
//! metadata; [`Value::to_wire`] is the untyped rendering used where no field type
//! applies (association fields, raw domain serialization).

use crate::operation::CollectionOperation;
use base64::Engine as _;
use chrono::{DateTime, FixedOffset, NaiveDate};
use indexmap::IndexMap;
use serde_json::{Number, Value as JsonValue};
use std::fmt;

/// Wire format for `date` values
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Wire format for `datetime` values
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A fetched record: column name to native value, in server order.
pub type Row = IndexMap<String, Value>;

/// A native value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    DateTime(DateTime<FixedOffset>),
    List(Vec<Value>),
    Map(IndexMap<String, Value>),
    Operation(CollectionOperation),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Atomic values: everything except lists, maps and collection operations.
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Value::List(_) | Value::Map(_) | Value::Operation(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Loose truthiness: `null`, `false`, `0`, `0.0`, `""`, `"0"` and empty
    /// containers are false, everything else is true.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::String(s) => !(s.is_empty() || s == "0"),
            Value::Bytes(b) => !(b.is_empty() || b.as_slice() == b"0"),
            Value::Date(_) | Value::DateTime(_) | Value::Operation(_) => true,
            Value::List(items) => !items.is_empty(),
            Value::Map(map) => !map.is_empty(),
        }
    }

    /// Short human readable name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Date(_) => "date",
            Value::DateTime(_) => "datetime",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Operation(_) => "operation",
        }
    }

    /// Render the value for the wire without any field-type knowledge.
    pub fn to_wire(&self) -> JsonValue {
        match self {
            Value::Null => JsonValue::Null,
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::Int(i) => JsonValue::Number((*i).into()),
            Value::Float(f) => Number::from_f64(*f).map_or(JsonValue::Null, JsonValue::Number),
            Value::String(s) => JsonValue::String(s.clone()),
            Value::Bytes(b) => {
                JsonValue::String(base64::engine::general_purpose::STANDARD.encode(b))
            }
            Value::Date(d) => JsonValue::String(d.format(DATE_FORMAT).to_string()),
            Value::DateTime(dt) => JsonValue::String(dt.format(DATETIME_FORMAT).to_string()),
            Value::List(items) => JsonValue::Array(items.iter().map(Value::to_wire).collect()),
            Value::Map(map) => JsonValue::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_wire()))
                    .collect(),
            ),
            Value::Operation(op) => op.to_array(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{s}"),
            Value::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            Value::DateTime(dt) => write!(f, "{}", dt.format(DATETIME_FORMAT)),
            other => write!(f, "{}", other.to_wire()),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(v: DateTime<FixedOffset>) -> Self {
        Value::DateTime(v)
    }
}

impl From<CollectionOperation> for Value {
    fn from(v: CollectionOperation) -> Self {
        Value::Operation(v)
    }
}

impl From<Scalar> for Value {
    fn from(v: Scalar) -> Self {
        match v {
            Scalar::Null => Value::Null,
            Scalar::Bool(b) => Value::Bool(b),
            Scalar::Int(i) => Value::Int(i),
            Scalar::Float(f) => Value::Float(f),
            Scalar::String(s) => Value::String(s),
            Scalar::Bytes(b) => Value::Bytes(b),
            Scalar::Date(d) => Value::Date(d),
            Scalar::DateTime(dt) => Value::DateTime(dt),
        }
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value> + Clone> From<&[T]> for Value {
    fn from(v: &[T]) -> Self {
        Value::List(v.iter().cloned().map(Into::into).collect())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(v: [T; N]) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(v: IndexMap<String, Value>) -> Self {
        Value::Map(v)
    }
}

impl From<JsonValue> for Value {
    fn from(v: JsonValue) -> Self {
        Value::from(&v)
    }
}

impl From<&JsonValue> for Value {
    fn from(v: &JsonValue) -> Self {
        match v {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Bool(*b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or_default()),
            },
            JsonValue::String(s) => Value::String(s.clone()),
            JsonValue::Array(items) => Value::List(items.iter().map(Value::from).collect()),
            JsonValue::Object(map) => Value::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

/// An atomic value, as held by a scalar result
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Scalar {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    DateTime(DateTime<FixedOffset>),
}

impl Scalar {
    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Scalar::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }
}

impl TryFrom<Value> for Scalar {
    type Error = Value;

    /// Fails with the original value when it is a list, map or operation.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Null => Ok(Scalar::Null),
            Value::Bool(b) => Ok(Scalar::Bool(b)),
            Value::Int(i) => Ok(Scalar::Int(i)),
            Value::Float(f) => Ok(Scalar::Float(f)),
            Value::String(s) => Ok(Scalar::String(s)),
            Value::Bytes(b) => Ok(Scalar::Bytes(b)),
            Value::Date(d) => Ok(Scalar::Date(d)),
            Value::DateTime(dt) => Ok(Scalar::DateTime(dt)),
            other => Err(other),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Value::from(self.clone()))
    }
}

/// Render a value for diagnostics, capped to `max` characters.
pub(crate) fn preview(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_string();
    }
    let truncated: String = value.chars().take(max).collect();
    format!("{truncated}...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_preserves_structure() {
        let value = Value::from(json!({"id": 7, "name": "Acme", "tags": [1, 2], "rate": 0.5}));
        let map = value.as_map().unwrap();
        assert_eq!(map["id"], Value::Int(7));
        assert_eq!(map["name"], Value::from("Acme"));
        assert_eq!(map["tags"], Value::from(vec![1, 2]));
        assert_eq!(map["rate"], Value::Float(0.5));
    }

    #[test]
    fn test_to_wire_renders_dates_and_bytes() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(Value::Date(date).to_wire(), json!("2024-02-29"));

        let dt = DateTime::parse_from_rfc3339("2024-02-29T13:45:00+02:00").unwrap();
        assert_eq!(Value::DateTime(dt).to_wire(), json!("2024-02-29 13:45:00"));

        assert_eq!(Value::Bytes(b"hi".to_vec()).to_wire(), json!("aGk="));
        assert_eq!(Value::Float(f64::NAN).to_wire(), JsonValue::Null);
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::from("0").is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(Value::from("Hello").is_truthy());
        assert!(!Value::Int(0).is_truthy());
        assert!(Value::from(vec![0]).is_truthy());
    }

    #[test]
    fn test_scalar_conversion_rejects_containers() {
        assert_eq!(Scalar::try_from(Value::Int(3)), Ok(Scalar::Int(3)));
        let list = Value::from(vec![1]);
        assert_eq!(Scalar::try_from(list.clone()), Err(list));
    }

    #[test]
    fn test_preview_caps_long_values() {
        assert_eq!(preview("short", 10), "short");
        assert_eq!(preview("abcdefghij", 4), "abcd...");
    }
}
