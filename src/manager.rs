//! `RecordManager`: the entry point wiring schema, conversion and queries.

use crate::config::DbalConfig;
use crate::context::Context;
use crate::domain::Domain;
use crate::error::DbalError;
use crate::executor::{RpcError, RpcExecutor};
use crate::normalizer::{ResultNormalizer, ValueNormalizer};
use crate::query::{Query, QueryBuilder, QueryFactory};
use crate::result::{ResultFactory, RowResult};
use crate::schema::{MemoryCache, MetadataCache, Schema};
use crate::types::{TypeConverter, TypeRegistry};
use crate::value::Value;
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// Shared handle over the executor, the schema and the query pipeline
///
/// Cloning is cheap; every clone shares the same schema cache. Queries keep a
/// clone so they can execute themselves.
///
/// # Example
///
/// ```no_run
/// use odoo_dbal::domain::eq;
/// use odoo_dbal::schema::MemoryCache;
/// use odoo_dbal::{DbalConfig, DbalError, RecordManager, RpcExecutor, Value};
/// use indexmap::IndexMap;
/// use std::sync::Arc;
///
/// # fn example(executor: Arc<dyn RpcExecutor>) -> Result<(), DbalError> {
/// let manager = RecordManager::new(executor, Arc::new(MemoryCache::new()), DbalConfig::default());
///
/// let mut values = IndexMap::new();
/// values.insert("name".to_string(), Value::from("Acme"));
/// let id = manager.create("res.partner", values)?;
/// let active = manager.count("res.partner", Some(eq("active", true).into()))?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct RecordManager {
    inner: Arc<Inner>,
}

struct Inner {
    executor: Arc<dyn RpcExecutor>,
    schema: Arc<Schema>,
    converter: Arc<TypeConverter>,
    query_factory: QueryFactory,
    result_factory: ResultFactory,
    config: DbalConfig,
}

impl RecordManager {
    /// Manager using the built-in field types.
    pub fn new(executor: Arc<dyn RpcExecutor>, cache: Arc<dyn MetadataCache>, config: DbalConfig) -> Self {
        Self::with_registry(executor, cache, config, TypeRegistry::with_builtins())
    }

    /// Manager using a custom type registry.
    pub fn with_registry(
        executor: Arc<dyn RpcExecutor>,
        cache: Arc<dyn MetadataCache>,
        config: DbalConfig,
        registry: TypeRegistry,
    ) -> Self {
        let schema = Arc::new(Schema::new(Arc::clone(&executor), cache, config.cache_prefix.clone()));
        let converter = Arc::new(TypeConverter::new(registry));
        let query_factory = QueryFactory::new(
            Arc::clone(&schema),
            ValueNormalizer::new(Arc::clone(&converter)),
            Context::with_timezone(config.timezone.clone()),
        );
        let result_factory = ResultFactory::new(ResultNormalizer::new(Arc::clone(&converter)));

        log::debug!(
            "RecordManager ready (cache prefix '{}', timezone {}, page size {})",
            config.cache_prefix,
            config.timezone,
            config.page_size
        );
        Self {
            inner: Arc::new(Inner {
                executor,
                schema,
                converter,
                query_factory,
                result_factory,
                config,
            }),
        }
    }

    /// Manager with an in-process metadata cache and default settings.
    pub fn in_memory(executor: Arc<dyn RpcExecutor>) -> Self {
        Self::new(executor, Arc::new(MemoryCache::new()), DbalConfig::default())
    }

    pub fn executor(&self) -> &Arc<dyn RpcExecutor> {
        &self.inner.executor
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.inner.schema
    }

    pub fn type_converter(&self) -> &Arc<TypeConverter> {
        &self.inner.converter
    }

    pub fn query_factory(&self) -> &QueryFactory {
        &self.inner.query_factory
    }

    pub fn result_factory(&self) -> &ResultFactory {
        &self.inner.result_factory
    }

    pub fn config(&self) -> &DbalConfig {
        &self.inner.config
    }

    /// A select builder on `model`.
    pub fn create_query_builder(&self, model: &str) -> Result<QueryBuilder, DbalError> {
        QueryBuilder::new(model)
    }

    pub fn create_query(&self, builder: &QueryBuilder) -> Result<Query, DbalError> {
        self.inner.query_factory.create_query(self, builder)
    }

    /// Read records by id, restricted to `fields` when given.
    pub fn find(&self, model: &str, ids: &[i64], fields: &[&str]) -> Result<RowResult, DbalError> {
        self.inner
            .query_factory
            .create_read_query(self, model, ids, fields, &Context::new())?
            .get_row_result()
    }

    /// Create one record and return its id.
    pub fn create(&self, model: &str, values: IndexMap<String, Value>) -> Result<i64, DbalError> {
        let builder = QueryBuilder::new(model)?.insert().set_values(values)?;
        let raw = self.create_query(&builder)?.execute()?;
        raw.as_i64()
            .ok_or_else(|| RpcError::InvalidResponse(format!("{} create returned {}", model, raw)).into())
    }

    pub fn update(&self, model: &str, ids: &[i64], values: IndexMap<String, Value>) -> Result<bool, DbalError> {
        let builder = QueryBuilder::new(model)?
            .update()
            .set_ids(ids.iter().copied())?
            .set_values(values)?;
        Ok(Value::from(self.create_query(&builder)?.execute()?).is_truthy())
    }

    pub fn delete(&self, model: &str, ids: &[i64]) -> Result<bool, DbalError> {
        let builder = QueryBuilder::new(model)?.delete().set_ids(ids.iter().copied())?;
        Ok(Value::from(self.create_query(&builder)?.execute()?).is_truthy())
    }

    /// Number of `model` records matching `criteria` (all records when `None`).
    pub fn count(&self, model: &str, criteria: Option<Domain>) -> Result<usize, DbalError> {
        let mut builder = QueryBuilder::new(model)?.search();
        if let Some(criteria) = criteria {
            builder = builder.where_(criteria)?;
        }
        self.create_query(&builder)?.count()
    }
}

impl fmt::Debug for RecordManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordManager")
            .field("schema", &self.inner.schema)
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}
