use crate::context::Context;
use crate::error::DbalError;
use crate::result::ResultError;
use crate::schema::ModelMetadata;
use crate::types::TypeConverter;
use crate::value::{Row, Value};
use serde_json::Value as JsonValue;
use std::sync::Arc;

/// Converts fetched records back into native values
#[derive(Debug, Clone)]
pub struct ResultNormalizer {
    converter: Arc<TypeConverter>,
}

impl ResultNormalizer {
    pub fn new(converter: Arc<TypeConverter>) -> Self {
        Self { converter }
    }

    /// Normalize one fetched record.
    ///
    /// Association columns, nulls and columns unknown to `model` keep their
    /// raw shape; every other column goes through its field type.
    pub fn normalize(&self, model: &ModelMetadata, row: &JsonValue, context: &Context) -> Result<Row, DbalError> {
        let JsonValue::Object(record) = row else {
            return Err(ResultError::InvalidRow {
                kind: Value::from(row).kind(),
            }
            .into());
        };

        let mut normalized = Row::with_capacity(record.len());
        for (name, raw) in record {
            let value = match model.field(name) {
                Some(field) if !field.is_association() && !raw.is_null() => {
                    self.converter.convert_to_native(&field.column_type, raw, context)?
                }
                _ => Value::from(raw),
            };
            normalized.insert(name.clone(), value);
        }
        Ok(normalized)
    }
}
