//! Schema metadata.
//!
//! [`Schema`] resolves model and field metadata. Metadata is fetched from the
//! server on first use (`ir.model`, `ir.model.fields`, `ir.model.fields.selection`)
//! and stored in a [`MetadataCache`] under two key families:
//!
//! - `<prefix>.schema.models`: the list of every model name
//! - `<prefix>.schema.model.<name>`: one [`ModelMetadata`] per model
//!
//! Every lookup goes through the cache, so deleting an entry there forces a
//! refetch on next use.

mod cache;
mod error;
mod metadata;
mod selection;

pub use cache::{CacheItem, MemoryCache, MetadataCache};
pub use error::SchemaError;
pub use metadata::{
    FieldMetadata, ModelMetadata, MULTIPLE_ASSOCIATION_TYPES, SINGLE_ASSOCIATION_TYPES,
};
pub use selection::{choices_from_records, parse_selection, Choice};

use crate::error::DbalError;
use crate::executor::{dispatch, RpcError, RpcExecutor};
#[cfg(feature = "tracing")]
use crate::tracing_helpers;
use serde_json::{json, Map, Value as JsonValue};
use std::sync::Arc;

const MODEL_MODEL: &str = "ir.model";
const FIELD_MODEL: &str = "ir.model.fields";
const SELECTION_MODEL: &str = "ir.model.fields.selection";

/// Lazily populated view of the server's models and fields
pub struct Schema {
    executor: Arc<dyn RpcExecutor>,
    cache: Arc<dyn MetadataCache>,
    cache_prefix: String,
}

impl Schema {
    pub fn new(
        executor: Arc<dyn RpcExecutor>,
        cache: Arc<dyn MetadataCache>,
        cache_prefix: impl Into<String>,
    ) -> Self {
        Self {
            executor,
            cache,
            cache_prefix: cache_prefix.into(),
        }
    }

    pub fn cache(&self) -> &Arc<dyn MetadataCache> {
        &self.cache
    }

    pub fn models_cache_key(&self) -> String {
        format!("{}.schema.models", self.cache_prefix)
    }

    pub fn model_cache_key(&self, model: &str) -> String {
        format!("{}.schema.model.{}", self.cache_prefix, model)
    }

    /// Technical names of every model known to the server.
    pub fn get_model_names(&self) -> Result<Vec<String>, DbalError> {
        let mut item = self.cache.get_item(&self.models_cache_key());
        if let Some(cached) = item.get() {
            match serde_json::from_value::<Vec<String>>(cached.clone()) {
                Ok(names) => return Ok(names),
                Err(e) => log::warn!("Ignoring unreadable cache entry {}: {}", item.key(), e),
            }
        }

        log::debug!("Fetching model names");
        let mut options = Map::new();
        options.insert("fields".to_string(), json!(["model"]));
        let response = self.call(MODEL_MODEL, &[json!([])], &options)?;
        let names: Vec<String> = records(MODEL_MODEL, response)?
            .iter()
            .filter_map(|record| record.get("model").and_then(JsonValue::as_str))
            .map(str::to_string)
            .collect();

        item.set(json!(names));
        self.cache.save(item);
        Ok(names)
    }

    pub fn has_model(&self, name: &str) -> Result<bool, DbalError> {
        Ok(self.get_model_names()?.iter().any(|n| n == name))
    }

    /// Metadata of `name`, fetched and cached on first access.
    pub fn get_model(&self, name: &str) -> Result<Arc<ModelMetadata>, DbalError> {
        if !self.has_model(name)? {
            return Err(SchemaError::ModelNotFound {
                model: name.to_string(),
            }
            .into());
        }

        let mut item = self.cache.get_item(&self.model_cache_key(name));
        let cached = item.get().and_then(|value| {
            serde_json::from_value::<ModelMetadata>(value.clone())
                .map_err(|e| log::warn!("Ignoring unreadable cache entry {}: {}", item.key(), e))
                .ok()
        });
        let model = match cached {
            Some(model) => {
                log::debug!("Schema cache hit for {}", name);
                model
            }
            None => {
                log::debug!("Schema cache miss for {}", name);
                let model = self.fetch_model(name)?;
                let value = serde_json::to_value(&model).map_err(|e| DbalError::Cache(e.to_string()))?;
                item.set(value);
                self.cache.save(item);
                model
            }
        };

        Ok(Arc::new(model))
    }

    /// Resolve a possibly dotted field path (`parent_id.country_id.code`).
    ///
    /// Every segment but the last must be an association whose target model
    /// exists.
    pub fn get_field(&self, model: &str, path: &str) -> Result<FieldMetadata, DbalError> {
        let mut current = self.get_model(model)?;
        let segments: Vec<&str> = path.split('.').collect();
        let mut traversed = String::new();

        for (i, segment) in segments.iter().enumerate() {
            if i > 0 {
                traversed.push('.');
            }
            traversed.push_str(segment);

            let field = current
                .field(segment)
                .cloned()
                .ok_or_else(|| SchemaError::FieldNotFound {
                    model: model.to_string(),
                    path: traversed.clone(),
                })?;
            if i + 1 == segments.len() {
                return Ok(field);
            }

            let target = match (&field.target_model, field.is_association()) {
                (Some(target), true) => target.clone(),
                _ => {
                    return Err(SchemaError::NotAssociation {
                        model: model.to_string(),
                        path: traversed,
                    }
                    .into())
                }
            };
            current = match self.get_model(&target) {
                Err(DbalError::Schema(SchemaError::ModelNotFound { .. })) => {
                    return Err(SchemaError::TargetModelNotFound {
                        model: model.to_string(),
                        path: traversed,
                        target,
                    }
                    .into())
                }
                other => other?,
            };
        }

        Err(SchemaError::FieldNotFound {
            model: model.to_string(),
            path: path.to_string(),
        }
        .into())
    }

    fn fetch_model(&self, name: &str) -> Result<ModelMetadata, DbalError> {
        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::fetch_model_span(name).entered();

        let mut options = Map::new();
        options.insert("limit".to_string(), json!(1));
        let response = self.call(MODEL_MODEL, &[json!([["model", "=", name]])], &options)?;
        let record = records(MODEL_MODEL, response)?
            .into_iter()
            .next()
            .ok_or_else(|| SchemaError::ModelNotFound {
                model: name.to_string(),
            })?;
        let mut model = ModelMetadata::from_record(&record).map_err(|reason| invalid(name, reason))?;

        let response = self.call(FIELD_MODEL, &[json!([["model_id", "=", model.id]])], &Map::new())?;
        for record in records(FIELD_MODEL, response)? {
            let mut field = FieldMetadata::from_record(&record).map_err(|reason| invalid(name, reason))?;
            if field.column_type == "selection" {
                field.selection = Some(self.fetch_selection(&field, &record)?);
            }
            model.fields.insert(field.name.clone(), field);
        }

        log::debug!("Fetched {} fields for model {}", model.fields.len(), name);
        Ok(model)
    }

    /// Choices from the linked selection records, or from the legacy literal.
    fn fetch_selection(
        &self,
        field: &FieldMetadata,
        record: &Map<String, JsonValue>,
    ) -> Result<Vec<Choice>, DbalError> {
        let linked = record
            .get("selection_ids")
            .and_then(JsonValue::as_array)
            .is_some_and(|ids| !ids.is_empty());
        if linked {
            let mut options = Map::new();
            options.insert("fields".to_string(), json!(["value", "name"]));
            let response = self.call(SELECTION_MODEL, &[json!([["field_id", "=", field.id]])], &options)?;
            let items: Vec<JsonValue> = records(SELECTION_MODEL, response)?
                .into_iter()
                .map(JsonValue::Object)
                .collect();
            return Ok(choices_from_records(&items));
        }

        Ok(record
            .get("selection")
            .and_then(JsonValue::as_str)
            .map(parse_selection)
            .unwrap_or_default())
    }

    fn call(&self, model: &str, params: &[JsonValue], options: &Map<String, JsonValue>) -> Result<JsonValue, DbalError> {
        dispatch(self.executor.as_ref(), model, "search_read", params, options)
    }
}

impl std::fmt::Debug for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schema")
            .field("cache_prefix", &self.cache_prefix)
            .finish_non_exhaustive()
    }
}

fn invalid(model: &str, reason: impl Into<String>) -> DbalError {
    SchemaError::InvalidMetadata {
        model: model.to_string(),
        reason: reason.into(),
    }
    .into()
}

/// A `search_read` response: a list of record objects.
fn records(model: &str, response: JsonValue) -> Result<Vec<Map<String, JsonValue>>, DbalError> {
    let JsonValue::Array(items) = response else {
        return Err(RpcError::InvalidResponse(format!("{} search_read did not return a list", model)).into());
    };
    items
        .into_iter()
        .map(|item| match item {
            JsonValue::Object(record) => Ok(record),
            other => Err(RpcError::InvalidResponse(format!("{} record is not an object: {}", model, other)).into()),
        })
        .collect()
}
