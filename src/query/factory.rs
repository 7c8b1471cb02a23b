//! Compiles a [`QueryBuilder`] into an executable [`Query`].

use super::{BuilderMethod, Query, QueryBuilder, QueryMethod};
use crate::context::Context;
use crate::error::{DbalError, QueryError};
use crate::manager::RecordManager;
use crate::normalizer::{CriteriaNormalizer, OrderNormalizer, ValueNormalizer};
use crate::schema::{ModelMetadata, Schema, SchemaError};
use serde_json::{json, Map, Value as JsonValue};
use std::sync::Arc;

/// Builder → query compiler
///
/// Resolves the target model, normalizes criteria, values and orders, and
/// lays out the positional parameters expected by each remote method:
///
/// | Builder method | Remote method | Parameters |
/// |---|---|---|
/// | select | `search_read` | `[domain]` |
/// | search | `search` | `[domain]` |
/// | insert | `create` | `[values]` |
/// | update | `write` | `[ids, values]` |
/// | delete | `unlink` | `[ids]` |
#[derive(Debug, Clone)]
pub struct QueryFactory {
    schema: Arc<Schema>,
    values: ValueNormalizer,
    criteria: CriteriaNormalizer,
    orders: OrderNormalizer,
    default_context: Context,
}

impl QueryFactory {
    pub fn new(schema: Arc<Schema>, values: ValueNormalizer, default_context: Context) -> Self {
        Self {
            criteria: CriteriaNormalizer::new(Arc::clone(&schema), values.clone()),
            schema,
            values,
            orders: OrderNormalizer,
            default_context,
        }
    }

    /// Builder context completed with the defaults (timezone).
    pub fn context_for(&self, context: &Context) -> Context {
        let mut context = context.clone();
        context.merge_defaults(&self.default_context);
        context
    }

    pub fn create_query(&self, manager: &RecordManager, builder: &QueryBuilder) -> Result<Query, DbalError> {
        let model = self.schema.get_model(builder.get_from())?;
        let context = self.context_for(builder.context());
        let method = builder.method();

        let (parameters, options) = match method {
            BuilderMethod::Select | BuilderMethod::Search => {
                let parameters = self.criteria.normalize(&model, builder.get_where(), &context)?;
                (parameters, self.read_options(&model, builder)?)
            }
            BuilderMethod::Delete => (vec![json!(self.require_ids(builder)?)], Map::new()),
            BuilderMethod::Insert => (vec![self.require_values(&model, builder, &context)?], Map::new()),
            BuilderMethod::Update => {
                let values = self.require_values(&model, builder, &context)?;
                (vec![json!(self.require_ids(builder)?), values], Map::new())
            }
        };

        log::debug!(
            "Compiled {} query on {}: {} parameters, options {:?}",
            method.query_method(),
            model.name,
            parameters.len(),
            options.keys().collect::<Vec<_>>()
        );
        Ok(Query::new(
            manager.clone(),
            model.name.clone(),
            method.query_method(),
            parameters,
            options,
            context,
        ))
    }

    /// A `read` query for `ids`, restricted to `fields` when given.
    pub fn create_read_query(
        &self,
        manager: &RecordManager,
        model: &str,
        ids: &[i64],
        fields: &[&str],
        context: &Context,
    ) -> Result<Query, DbalError> {
        let model = self.schema.get_model(model)?;
        if ids.is_empty() {
            return Err(QueryError::MissingIds {
                method: QueryMethod::Read.to_string(),
            }
            .into());
        }
        let mut options = Map::new();
        if !fields.is_empty() {
            options.insert("fields".to_string(), json!(checked_fields(&model, fields.iter().copied())?));
        }
        Ok(Query::new(
            manager.clone(),
            model.name.clone(),
            QueryMethod::Read,
            vec![json!(ids)],
            options,
            self.context_for(context),
        ))
    }

    fn read_options(&self, model: &ModelMetadata, builder: &QueryBuilder) -> Result<Map<String, JsonValue>, DbalError> {
        let mut options = Map::new();
        if builder.method() == BuilderMethod::Select {
            let fields = builder.get_select()?;
            if !fields.is_empty() {
                let fields = checked_fields(model, fields.iter().map(String::as_str))?;
                options.insert("fields".to_string(), json!(fields));
            }
        }
        if let Some(order) = self.orders.normalize(model, builder.get_orders())? {
            options.insert("order".to_string(), json!(order));
        }
        if let Some(offset) = builder.get_first_result().filter(|offset| *offset > 0) {
            options.insert("offset".to_string(), json!(offset));
        }
        if let Some(limit) = builder.get_max_results() {
            options.insert("limit".to_string(), json!(limit));
        }
        Ok(options)
    }

    fn require_ids(&self, builder: &QueryBuilder) -> Result<Vec<i64>, DbalError> {
        if builder.get_ids().is_empty() {
            return Err(QueryError::MissingIds {
                method: builder.method().query_method().to_string(),
            }
            .into());
        }
        Ok(builder.get_ids().to_vec())
    }

    fn require_values(
        &self,
        model: &ModelMetadata,
        builder: &QueryBuilder,
        context: &Context,
    ) -> Result<JsonValue, DbalError> {
        let values = self.values.normalize(model, builder.get_values(), context)?;
        if values.is_empty() {
            return Err(QueryError::EmptyValues {
                method: builder.method().query_method().to_string(),
            }
            .into());
        }
        Ok(JsonValue::Object(values))
    }
}

fn checked_fields<'a, I>(model: &ModelMetadata, fields: I) -> Result<Vec<String>, DbalError>
where
    I: IntoIterator<Item = &'a str>,
{
    fields
        .into_iter()
        .map(|name| {
            if model.has_field(name) {
                Ok(name.to_string())
            } else {
                Err(SchemaError::FieldNotFound {
                    model: model.name.clone(),
                    path: name.to_string(),
                }
                .into())
            }
        })
        .collect()
}
