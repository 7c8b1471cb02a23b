use super::{ConversionError, Type};
use crate::context::Context;
use crate::value::Value;
use serde_json::{Number, Value as JsonValue};

/// `integer` columns
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerType;

/// `float` and `monetary` columns
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatType;

impl Type for IntegerType {
    fn name(&self) -> &str {
        "integer"
    }

    fn convert_to_wire(&self, value: &Value, _context: &Context) -> Result<JsonValue, ConversionError> {
        Ok(to_int(value, self.name())?.map_or(JsonValue::Null, |i| JsonValue::Number(i.into())))
    }

    fn convert_to_native(&self, value: &JsonValue, _context: &Context) -> Result<Value, ConversionError> {
        Ok(to_int(&Value::from(value), self.name())?.map_or(Value::Null, Value::Int))
    }
}

impl Type for FloatType {
    fn name(&self) -> &str {
        "float"
    }

    fn convert_to_wire(&self, value: &Value, _context: &Context) -> Result<JsonValue, ConversionError> {
        Ok(to_float(value, self.name())?
            .and_then(Number::from_f64)
            .map_or(JsonValue::Null, JsonValue::Number))
    }

    fn convert_to_native(&self, value: &JsonValue, _context: &Context) -> Result<Value, ConversionError> {
        Ok(to_float(&Value::from(value), self.name())?.map_or(Value::Null, Value::Float))
    }
}

fn to_int(value: &Value, type_name: &str) -> Result<Option<i64>, ConversionError> {
    match value {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(i64::from(*b))),
        Value::Int(i) => Ok(Some(*i)),
        Value::Float(f) => Ok(Some(f.trunc() as i64)),
        Value::String(s) => Ok(Some(parse_int(s))),
        Value::Bytes(b) => Ok(Some(parse_int(&String::from_utf8_lossy(b)))),
        other => Err(ConversionError::invalid_type(other, type_name)),
    }
}

fn to_float(value: &Value, type_name: &str) -> Result<Option<f64>, ConversionError> {
    match value {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(if *b { 1.0 } else { 0.0 })),
        Value::Int(i) => Ok(Some(*i as f64)),
        Value::Float(f) => Ok(Some(*f)),
        Value::String(s) => Ok(Some(leading_number(s).unwrap_or(0.0))),
        Value::Bytes(b) => Ok(Some(leading_number(&String::from_utf8_lossy(b)).unwrap_or(0.0))),
        other => Err(ConversionError::invalid_type(other, type_name)),
    }
}

/// Numeric string cast: the longest numeric prefix wins, no prefix gives zero.
fn parse_int(s: &str) -> i64 {
    let s = s.trim();
    if let Ok(i) = s.parse::<i64>() {
        return i;
    }
    leading_number(s).map_or(0, |f| f.trunc() as i64)
}

fn leading_number(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
    }
    if end == digits_start || &s[digits_start..end] == "." {
        return None;
    }
    // exponent only counts when followed by digits
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits {
            end = exp_end;
        }
    }
    s[..end].parse::<f64>().ok()
}
