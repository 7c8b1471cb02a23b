use super::{ConversionError, Type};
use crate::context::Context;
use crate::value::Value;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::Value as JsonValue;

/// `binary` columns, base64 encoded on the wire
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryType;

impl Type for BinaryType {
    fn name(&self) -> &str {
        "binary"
    }

    fn convert_to_wire(&self, value: &Value, _context: &Context) -> Result<JsonValue, ConversionError> {
        let bytes = match value {
            Value::Null => return Ok(JsonValue::Null),
            Value::String(s) => s.trim().as_bytes().to_vec(),
            Value::Bytes(b) => b.clone(),
            other => return Err(ConversionError::invalid_type(other, self.name())),
        };
        if bytes.is_empty() {
            return Ok(JsonValue::Null);
        }
        Ok(JsonValue::String(STANDARD.encode(bytes)))
    }

    fn convert_to_native(&self, value: &JsonValue, _context: &Context) -> Result<Value, ConversionError> {
        let JsonValue::String(encoded) = value else {
            return Ok(Value::Null);
        };
        let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
        if compact.is_empty() {
            return Ok(Value::Null);
        }
        match STANDARD.decode(compact.as_bytes()) {
            Ok(bytes) => Ok(Value::Bytes(bytes)),
            Err(err) => {
                log::debug!("Discarding undecodable binary value: {}", err);
                Ok(Value::Null)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_round_trip() {
        let ctx = Context::new();
        let wire = BinaryType
            .convert_to_wire(&Value::from("Hello world!"), &ctx)
            .unwrap();
        assert_eq!(wire, json!("SGVsbG8gd29ybGQh"));
        assert_eq!(
            BinaryType.convert_to_native(&wire, &ctx).unwrap(),
            Value::Bytes(b"Hello world!".to_vec())
        );
    }

    #[test]
    fn test_empty_and_invalid_inputs_are_null() {
        let ctx = Context::new();
        assert_eq!(BinaryType.convert_to_wire(&Value::from("   "), &ctx).unwrap(), JsonValue::Null);
        assert_eq!(BinaryType.convert_to_wire(&Value::Bytes(vec![]), &ctx).unwrap(), JsonValue::Null);
        assert_eq!(BinaryType.convert_to_native(&json!(""), &ctx).unwrap(), Value::Null);
        assert_eq!(BinaryType.convert_to_native(&json!("%%%"), &ctx).unwrap(), Value::Null);
        assert_eq!(BinaryType.convert_to_native(&json!(false), &ctx).unwrap(), Value::Null);
    }

    #[test]
    fn test_rejects_non_binary_values() {
        let ctx = Context::new();
        assert!(BinaryType.convert_to_wire(&Value::Int(3), &ctx).is_err());
    }

    #[test]
    fn test_decode_ignores_line_breaks() {
        let ctx = Context::new();
        assert_eq!(
            BinaryType.convert_to_native(&json!("SGVs\nbG8="), &ctx).unwrap(),
            Value::Bytes(b"Hello".to_vec())
        );
    }
}
