use super::{ArrayResult, ResultError, RowResult, ScalarResult};
use crate::context::Context;
use crate::error::DbalError;
use crate::executor::RpcError;
use crate::normalizer::ResultNormalizer;
use crate::query::QueryMethod;
use crate::schema::ModelMetadata;
use crate::value::Value;
use serde_json::Value as JsonValue;

/// Wraps raw responses into result containers.
///
/// Records (JSON objects) are normalized through the [`ResultNormalizer`];
/// everything else is kept as an untyped native value.
#[derive(Debug, Clone)]
pub struct ResultFactory {
    normalizer: ResultNormalizer,
}

impl ResultFactory {
    pub fn new(normalizer: ResultNormalizer) -> Self {
        Self { normalizer }
    }

    /// One entry per returned item. A `search_count` response becomes a
    /// single entry.
    pub fn create_array_result(
        &self,
        model: &ModelMetadata,
        method: QueryMethod,
        raw: JsonValue,
        context: &Context,
    ) -> Result<ArrayResult<Value>, DbalError> {
        let mut result = ArrayResult::new();
        for item in entries(model, method, raw)? {
            let value = match item {
                JsonValue::Object(_) => Value::Map(self.normalizer.normalize(model, &item, context)?),
                other => Value::from(other),
            };
            result.offset_set(None, value)?;
        }
        Ok(result)
    }

    /// Records of a `search_read` or `read` response.
    pub fn create_row_result(&self, model: &ModelMetadata, raw: JsonValue, context: &Context) -> Result<RowResult, DbalError> {
        let mut result = RowResult::new();
        for item in entries(model, QueryMethod::SearchRead, raw)? {
            result.offset_set(None, self.normalizer.normalize(model, &item, context)?)?;
        }
        Ok(result)
    }

    /// Scalars of a response: ids for `search`, the total for
    /// `search_count`, the first column of the records otherwise.
    pub fn create_scalar_result(
        &self,
        model: &ModelMetadata,
        method: QueryMethod,
        raw: JsonValue,
        context: &Context,
    ) -> Result<ScalarResult, DbalError> {
        match method {
            QueryMethod::SearchRead | QueryMethod::Read => {
                Ok(self.create_row_result(model, raw, context)?.scalars(None)?)
            }
            _ => {
                let values = entries(model, method, raw)?.into_iter().map(Value::from);
                Ok(ScalarResult::from_values(values)?)
            }
        }
    }
}

fn entries(model: &ModelMetadata, method: QueryMethod, raw: JsonValue) -> Result<Vec<JsonValue>, DbalError> {
    match raw {
        JsonValue::Array(items) => Ok(items),
        JsonValue::Number(_) if method == QueryMethod::SearchCount => Ok(vec![raw]),
        JsonValue::Number(_) | JsonValue::Bool(_) | JsonValue::String(_) | JsonValue::Object(_) => {
            Err(RpcError::InvalidResponse(format!(
                "{} {} returned {} instead of a list",
                model.name,
                method,
                Value::from(&raw).kind()
            ))
            .into())
        }
        JsonValue::Null => Err(ResultError::InvalidRow { kind: "null" }.into()),
    }
}
