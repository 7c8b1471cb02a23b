//! Compiled queries and their execution helpers.

use super::QueryMethod;
use crate::context::Context;
use crate::error::{DbalError, QueryError};
use crate::executor::{dispatch, RpcError};
use crate::manager::RecordManager;
use crate::result::{ArrayResult, LazyResult, Paginator, RowResult, ScalarResult};
use crate::value::{Row, Scalar, Value};
use serde_json::{Map, Value as JsonValue};
use std::fmt;

/// Options dropped when a search is turned into a count
const PAGING_OPTIONS: [&str; 4] = ["fields", "order", "offset", "limit"];

/// A remote call ready to run: model, method, positional parameters, options.
///
/// Queries are plain values. [`duplicate`](Self::duplicate) gives an
/// independent copy that can be altered without touching the original; the
/// paginator relies on this to page through results.
#[derive(Clone)]
pub struct Query {
    manager: RecordManager,
    name: String,
    method: QueryMethod,
    parameters: Vec<JsonValue>,
    options: Map<String, JsonValue>,
    context: Context,
}

impl Query {
    pub fn new(
        manager: RecordManager,
        name: impl Into<String>,
        method: QueryMethod,
        parameters: Vec<JsonValue>,
        options: Map<String, JsonValue>,
        context: Context,
    ) -> Self {
        Self {
            manager,
            name: name.into(),
            method,
            parameters,
            options,
            context,
        }
    }

    pub fn duplicate(&self) -> Self {
        self.clone()
    }

    pub fn record_manager(&self) -> &RecordManager {
        &self.manager
    }

    /// Target model name
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn method(&self) -> QueryMethod {
        self.method
    }

    pub fn set_method(&mut self, method: QueryMethod) -> &mut Self {
        self.method = method;
        self
    }

    pub fn parameters(&self) -> &[JsonValue] {
        &self.parameters
    }

    pub fn set_parameters(&mut self, parameters: Vec<JsonValue>) -> &mut Self {
        self.parameters = parameters;
        self
    }

    pub fn options(&self) -> &Map<String, JsonValue> {
        &self.options
    }

    pub fn set_options(&mut self, options: Map<String, JsonValue>) -> &mut Self {
        self.options = options;
        self
    }

    pub fn set_option(&mut self, key: &str, value: impl Into<JsonValue>) -> &mut Self {
        self.options.insert(key.to_string(), value.into());
        self
    }

    pub fn remove_option(&mut self, key: &str) -> Option<JsonValue> {
        self.options.remove(key)
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn set_context(&mut self, context: Context) -> &mut Self {
        self.context = context;
        self
    }

    /// Run the query and return the raw response.
    pub fn execute(&self) -> Result<JsonValue, DbalError> {
        dispatch(
            &**self.manager.executor(),
            &self.name,
            self.method.as_str(),
            &self.parameters,
            &self.options,
        )
    }

    /// Number of records the query matches or touches.
    ///
    /// - `search_count`: executed as is
    /// - `search`, `search_read`: re-run as `search_count` on the same domain
    /// - `create`: 1
    /// - `write`, `unlink`, `read`: number of ids in the first parameter
    pub fn count(&self) -> Result<usize, DbalError> {
        match self.method {
            QueryMethod::SearchCount => count_of(&self.name, self.execute()?),
            QueryMethod::Search | QueryMethod::SearchRead => {
                let mut counter = self.duplicate();
                counter.method = QueryMethod::SearchCount;
                counter.parameters.truncate(1);
                for key in PAGING_OPTIONS {
                    counter.options.remove(key);
                }
                counter.count()
            }
            QueryMethod::Create => Ok(1),
            QueryMethod::Write | QueryMethod::Unlink | QueryMethod::Read => Ok(self
                .parameters
                .first()
                .and_then(JsonValue::as_array)
                .map_or(0, |ids| ids.iter().filter(|id| Value::from(*id).is_truthy()).count())),
        }
    }

    /// Execute and wrap every returned entry.
    pub fn get_result(&self) -> Result<ArrayResult<Value>, DbalError> {
        self.require(&QueryMethod::READ_METHODS, "get_result")?;
        let raw = self.execute()?;
        let model = self.manager.schema().get_model(&self.name)?;
        self.manager
            .result_factory()
            .create_array_result(&model, self.method, raw, &self.context)
    }

    pub fn get_scalar_result(&self) -> Result<ScalarResult, DbalError> {
        self.require(&QueryMethod::READ_METHODS, "get_scalar_result")?;
        let raw = self.execute()?;
        let model = self.manager.schema().get_model(&self.name)?;
        self.manager
            .result_factory()
            .create_scalar_result(&model, self.method, raw, &self.context)
    }

    /// Records, for `search_read` and `read` queries.
    pub fn get_row_result(&self) -> Result<RowResult, DbalError> {
        self.require(&[QueryMethod::SearchRead, QueryMethod::Read], "get_row_result")?;
        let raw = self.execute()?;
        let model = self.manager.schema().get_model(&self.name)?;
        self.manager
            .result_factory()
            .create_row_result(&model, raw, &self.context)
    }

    /// Exactly one record.
    ///
    /// # Errors
    ///
    /// `NoResult` when nothing matches, `NonUniqueResult` when several records do.
    pub fn get_single_result(&self) -> Result<Row, DbalError> {
        self.get_one_or_null_result()?.ok_or(DbalError::NoResult)
    }

    /// At most one record.
    pub fn get_one_or_null_result(&self) -> Result<Option<Row>, DbalError> {
        single(self.get_row_result()?.into_inner())
    }

    pub fn get_single_scalar_result(&self) -> Result<Scalar, DbalError> {
        self.get_one_or_null_scalar_result()?.ok_or(DbalError::NoResult)
    }

    pub fn get_one_or_null_scalar_result(&self) -> Result<Option<Scalar>, DbalError> {
        single(self.get_scalar_result()?)
    }

    /// Page through the results of a copy of this query.
    ///
    /// `page_size` defaults to the configured page size; `context` replaces the
    /// query context for the copy.
    pub fn paginate(&self, page_size: Option<usize>, context: Option<Context>) -> Result<Paginator, DbalError> {
        let mut query = self.duplicate();
        if let Some(context) = context {
            query.context = self.manager.query_factory().context_for(&context);
        }
        let page_size = page_size.unwrap_or(self.manager.config().page_size);
        Paginator::new(query, page_size)
    }

    /// Lazily iterate over every matching record, fetching `chunk_size` at a time.
    pub fn iterate(&self, chunk_size: Option<usize>) -> Result<LazyResult, DbalError> {
        Ok(LazyResult::new(self.paginate(chunk_size, None)?))
    }

    fn require(&self, allowed: &[QueryMethod], operation: &'static str) -> Result<(), DbalError> {
        if allowed.contains(&self.method) {
            return Ok(());
        }
        Err(QueryError::InvalidQueryMethod {
            operation,
            method: self.method.to_string(),
            allowed: allowed.iter().map(ToString::to_string).collect(),
        }
        .into())
    }
}

impl fmt::Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("name", &self.name)
            .field("method", &self.method)
            .field("parameters", &self.parameters)
            .field("options", &self.options)
            .field("context", &self.context)
            .finish()
    }
}

impl PartialEq for Query {
    /// Two queries are equal when they would send the same call.
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.method == other.method
            && self.parameters == other.parameters
            && self.options == other.options
            && self.context == other.context
    }
}

fn count_of(model: &str, raw: JsonValue) -> Result<usize, DbalError> {
    raw.as_u64().map(|n| n as usize).ok_or_else(|| {
        RpcError::InvalidResponse(format!("{} search_count returned {}", model, raw)).into()
    })
}

fn single<T: Clone>(result: ArrayResult<T>) -> Result<Option<T>, DbalError> {
    match result.len() {
        0 => Ok(None),
        1 => Ok(result.first().cloned()),
        count => Err(DbalError::NonUniqueResult { count }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::eq;
    use crate::query::QueryBuilder;
    use crate::test_helpers::{partner_fixture, MockExecutor};
    use serde_json::json;
    use std::sync::Arc;

    fn setup() -> (MockExecutor, RecordManager) {
        let mock = partner_fixture();
        let manager = RecordManager::in_memory(Arc::new(mock.clone()));
        (mock, manager)
    }

    fn active_partners(manager: &RecordManager) -> Query {
        let builder = QueryBuilder::new("res.partner")
            .unwrap()
            .select(["name"])
            .unwrap()
            .where_(eq("active", true))
            .unwrap()
            .set_max_results(Some(10))
            .unwrap();
        manager.create_query(&builder).unwrap()
    }

    #[test]
    fn test_count_search_strips_paging_options() {
        let (mock, manager) = setup();
        let query = active_partners(&manager);
        mock.clear_calls();

        assert_eq!(query.count().unwrap(), 2);
        let calls = mock.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, "search_count");
        assert_eq!(calls[0].params, vec![json!([["active", "=", true]])]);
        assert!(calls[0].options.is_empty());
        assert_eq!(query.method(), QueryMethod::SearchRead);
    }

    #[test]
    fn test_count_without_remote_call() {
        let (mock, manager) = setup();
        let context = Context::new();
        let write = Query::new(
            manager.clone(),
            "res.partner",
            QueryMethod::Write,
            vec![json!([1, 0, 2, false]), json!({"name": "x"})],
            Map::new(),
            context.clone(),
        );
        assert_eq!(write.count().unwrap(), 2);

        let create = Query::new(manager, "res.partner", QueryMethod::Create, vec![json!({})], Map::new(), context);
        assert_eq!(create.count().unwrap(), 1);
        assert!(mock.calls().is_empty());
    }

    #[test]
    fn test_row_result_normalizes_values() {
        let (_, manager) = setup();
        let rows = active_partners(&manager).get_row_result().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows.first().unwrap()["name"], Value::from("Acme"));
        assert_eq!(rows.scalars(Some("id")).unwrap().ids(), vec![1, 2]);
    }

    #[test]
    fn test_single_result_contract() {
        let (_, manager) = setup();
        let query = active_partners(&manager);
        assert_eq!(
            query.get_single_result().unwrap_err(),
            DbalError::NonUniqueResult { count: 2 }
        );

        let mut missing = query.duplicate();
        missing.set_parameters(vec![json!([["name", "=", "Nobody"]])]);
        assert_eq!(missing.get_single_result().unwrap_err(), DbalError::NoResult);
        assert_eq!(missing.get_one_or_null_result().unwrap(), None);

        let mut one = query.duplicate();
        one.set_option("limit", 1);
        assert_eq!(one.get_single_result().unwrap()["name"], Value::from("Acme"));
    }

    #[test]
    fn test_scalar_results() {
        let (_, manager) = setup();
        let builder = QueryBuilder::new("res.partner")
            .unwrap()
            .search()
            .where_(eq("parent_id", 1))
            .unwrap();
        let query = manager.create_query(&builder).unwrap();
        assert_eq!(query.get_scalar_result().unwrap().ids(), vec![2]);
        assert_eq!(query.get_single_scalar_result().unwrap(), Scalar::Int(2));
    }

    #[test]
    fn test_row_result_requires_records() {
        let (_, manager) = setup();
        let builder = QueryBuilder::new("res.partner").unwrap().search();
        let query = manager.create_query(&builder).unwrap();
        let err = query.get_row_result().unwrap_err();
        assert!(matches!(
            err,
            DbalError::Query(QueryError::InvalidQueryMethod { operation: "get_row_result", .. })
        ));
    }

    #[test]
    fn test_write_queries_have_no_result() {
        let (_, manager) = setup();
        let builder = QueryBuilder::new("res.partner").unwrap().delete().add_id(3).unwrap();
        let query = manager.create_query(&builder).unwrap();
        assert!(query.get_result().is_err());
        assert!(query.paginate(None, None).is_err());
        assert_eq!(query.execute().unwrap(), json!(true));
    }

    #[test]
    fn test_paginate_works_on_a_copy() {
        let (_, manager) = setup();
        let query = active_partners(&manager);
        let paginator = query.paginate(Some(1), Some(Context::with_timezone("+01:00"))).unwrap();
        assert_eq!(paginator.page_size(), 1);
        assert_eq!(paginator.query().context().timezone(), "+01:00");
        assert_eq!(query.context().timezone(), "UTC");

        let default_size = query.paginate(None, None).unwrap();
        assert_eq!(default_size.page_size(), 100);
    }

    #[test]
    fn test_duplicate_is_independent() {
        let (_, manager) = setup();
        let query = active_partners(&manager);
        let mut copy = query.duplicate();
        assert_eq!(copy, query);
        copy.set_option("offset", 5);
        assert_ne!(copy, query);
        assert!(query.options().get("offset").is_none());
    }
}
