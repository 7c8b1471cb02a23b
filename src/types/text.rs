use super::{ConversionError, Type};
use crate::context::Context;
use crate::value::{Value, DATETIME_FORMAT, DATE_FORMAT};
use serde_json::Value as JsonValue;

/// `char`, `text` and `html` columns: always a trimmed string or null
#[derive(Debug, Clone, Copy, Default)]
pub struct TextType;

/// `selection` columns: trimmed strings, other scalars untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct ScalarType;

impl Type for TextType {
    fn name(&self) -> &str {
        "text"
    }

    fn convert_to_wire(&self, value: &Value, _context: &Context) -> Result<JsonValue, ConversionError> {
        let text = match value {
            Value::Null => return Ok(JsonValue::Null),
            Value::String(s) => s.clone(),
            Value::Bytes(b) => String::from_utf8_lossy(b).into_owned(),
            Value::Bool(true) => "1".to_string(),
            Value::Bool(false) => String::new(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Date(d) => d.format(DATE_FORMAT).to_string(),
            Value::DateTime(dt) => dt.format(DATETIME_FORMAT).to_string(),
            other => return Err(ConversionError::invalid_type(other, self.name())),
        };
        Ok(trimmed(&text).map_or(JsonValue::Null, JsonValue::String))
    }

    fn convert_to_native(&self, value: &JsonValue, _context: &Context) -> Result<Value, ConversionError> {
        match value {
            JsonValue::String(s) => Ok(trimmed(s).map_or(Value::Null, Value::String)),
            // the server reports unset text columns as `false`
            JsonValue::Null | JsonValue::Bool(false) => Ok(Value::Null),
            JsonValue::Bool(true) => Ok(Value::from("1")),
            JsonValue::Number(n) => Ok(Value::String(n.to_string())),
            other => Err(ConversionError::invalid_type(&Value::from(other), self.name())),
        }
    }
}

impl Type for ScalarType {
    fn name(&self) -> &str {
        "scalar"
    }

    fn convert_to_wire(&self, value: &Value, _context: &Context) -> Result<JsonValue, ConversionError> {
        match value {
            Value::String(s) => Ok(trimmed(s).map_or(JsonValue::Null, JsonValue::String)),
            other if other.is_scalar() => Ok(other.to_wire()),
            other => Err(ConversionError::invalid_type(other, self.name())),
        }
    }

    fn convert_to_native(&self, value: &JsonValue, _context: &Context) -> Result<Value, ConversionError> {
        match value {
            JsonValue::String(s) => Ok(trimmed(s).map_or(Value::Null, Value::String)),
            JsonValue::Bool(false) => Ok(Value::Null),
            JsonValue::Array(_) | JsonValue::Object(_) => {
                Err(ConversionError::invalid_type(&Value::from(value), self.name()))
            }
            other => Ok(Value::from(other)),
        }
    }
}

fn trimmed(s: &str) -> Option<String> {
    let s = s.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_trims_and_nulls_blank() {
        let ctx = Context::new();
        assert_eq!(TextType.convert_to_wire(&Value::from("  Acme  "), &ctx).unwrap(), json!("Acme"));
        assert_eq!(TextType.convert_to_wire(&Value::from("  "), &ctx).unwrap(), JsonValue::Null);
        assert_eq!(TextType.convert_to_wire(&Value::Int(12), &ctx).unwrap(), json!("12"));
        assert_eq!(TextType.convert_to_wire(&Value::Null, &ctx).unwrap(), JsonValue::Null);
    }

    #[test]
    fn test_text_native_direction() {
        let ctx = Context::new();
        assert_eq!(TextType.convert_to_native(&json!(" Acme "), &ctx).unwrap(), Value::from("Acme"));
        assert_eq!(TextType.convert_to_native(&json!(false), &ctx).unwrap(), Value::Null);
        assert!(TextType.convert_to_native(&json!([1]), &ctx).is_err());
    }

    #[test]
    fn test_text_rejects_non_scalars() {
        let ctx = Context::new();
        let err = TextType
            .convert_to_wire(&Value::from(vec!["a"]), &ctx)
            .unwrap_err();
        assert!(matches!(err, ConversionError::InvalidType { kind: "list", .. }));
    }

    #[test]
    fn test_scalar_passes_non_strings_through() {
        let ctx = Context::new();
        assert_eq!(ScalarType.convert_to_wire(&Value::Int(3), &ctx).unwrap(), json!(3));
        assert_eq!(ScalarType.convert_to_wire(&Value::from(" draft "), &ctx).unwrap(), json!("draft"));
        assert_eq!(ScalarType.convert_to_wire(&Value::from(""), &ctx).unwrap(), JsonValue::Null);
        assert!(ScalarType.convert_to_wire(&Value::from(vec![1]), &ctx).is_err());
        assert_eq!(ScalarType.convert_to_native(&json!("done"), &ctx).unwrap(), Value::from("done"));
    }
}
