use crate::context::Context;
use crate::error::DbalError;
use crate::schema::{FieldMetadata, ModelMetadata, SchemaError};
use crate::types::TypeConverter;
use crate::value::Value;
use indexmap::IndexMap;
use serde_json::{Map, Value as JsonValue};
use std::sync::Arc;

/// Converts native write values into wire values, field by field
#[derive(Debug, Clone)]
pub struct ValueNormalizer {
    converter: Arc<TypeConverter>,
}

impl ValueNormalizer {
    pub fn new(converter: Arc<TypeConverter>) -> Self {
        Self { converter }
    }

    /// Normalize a `field → value` payload against `model`.
    ///
    /// Keys are matched by exact field name; dotted paths are not resolved.
    pub fn normalize(
        &self,
        model: &ModelMetadata,
        values: &IndexMap<String, Value>,
        context: &Context,
    ) -> Result<Map<String, JsonValue>, DbalError> {
        let mut normalized = Map::with_capacity(values.len());
        for (name, value) in values {
            let field = model.field(name).ok_or_else(|| SchemaError::FieldNotFound {
                model: model.name.clone(),
                path: name.clone(),
            })?;
            normalized.insert(name.clone(), self.normalize_field_value(field, value, context)?);
        }
        Ok(normalized)
    }

    /// Normalize one value for `field`.
    ///
    /// Association values (ids, id lists, collection operations) go out
    /// untouched; lists are converted element-wise.
    pub fn normalize_field_value(
        &self,
        field: &FieldMetadata,
        value: &Value,
        context: &Context,
    ) -> Result<JsonValue, DbalError> {
        if field.is_association() {
            return Ok(value.to_wire());
        }
        match value {
            Value::List(items) => items
                .iter()
                .map(|item| self.normalize_field_value(field, item, context))
                .collect::<Result<Vec<_>, _>>()
                .map(JsonValue::Array),
            _ => Ok(self
                .converter
                .convert_to_wire(&field.column_type, value, context)?),
        }
    }
}
