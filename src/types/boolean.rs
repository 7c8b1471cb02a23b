use super::{ConversionError, Type};
use crate::context::Context;
use crate::value::Value;
use serde_json::Value as JsonValue;

/// `boolean` columns
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanType;

impl Type for BooleanType {
    fn name(&self) -> &str {
        "boolean"
    }

    fn convert_to_wire(&self, value: &Value, _context: &Context) -> Result<JsonValue, ConversionError> {
        Ok(JsonValue::Bool(value.is_truthy()))
    }

    fn convert_to_native(&self, value: &JsonValue, _context: &Context) -> Result<Value, ConversionError> {
        let flag = match value {
            // Only explicit "true"/"1" strings count as true
            JsonValue::String(s) => {
                let s = s.trim();
                s.eq_ignore_ascii_case("true") || s == "1"
            }
            other => Value::from(other).is_truthy(),
        };
        Ok(Value::Bool(flag))
    }
}
