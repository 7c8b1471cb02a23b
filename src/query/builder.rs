//! Query builder.
//!
//! A [`QueryBuilder`] is a small state machine: its [`BuilderMethod`] decides
//! which setters are legal. Switching method through [`select`](QueryBuilder::select),
//! [`search`](QueryBuilder::search), [`insert`](QueryBuilder::insert),
//! [`update`](QueryBuilder::update) or [`delete`](QueryBuilder::delete) clears
//! every other piece of state first.
//!
//! | Setter | Allowed methods |
//! |---|---|
//! | `add_select`, `get_select` | select |
//! | `set_ids`, `add_id` | update, delete |
//! | `set_values`, `set` | insert, update |
//! | `where_`, `and_where`, `or_where` | select, search |
//! | `set_orders`, `order_by`, `add_order_by` | select, search |
//! | `set_max_results`, `set_first_result` | select, search |

use super::BuilderMethod;
use crate::context::Context;
use crate::domain::{CompositeDomain, Domain, LogicalOperator};
use crate::error::{DbalError, QueryError};
use crate::normalizer::OrderDirection;
use crate::value::Value;
use indexmap::IndexMap;
use serde_json::Value as JsonValue;

const READ: &[BuilderMethod] = &[BuilderMethod::Select, BuilderMethod::Search];
const TARGETED: &[BuilderMethod] = &[BuilderMethod::Update, BuilderMethod::Delete];
const WRITING: &[BuilderMethod] = &[BuilderMethod::Insert, BuilderMethod::Update];

/// Mutable description of a query, compiled by [`QueryFactory`](super::QueryFactory)
///
/// # Example
///
/// ```
/// use odoo_dbal::domain::eq;
/// use odoo_dbal::query::{BuilderMethod, QueryBuilder};
///
/// # fn main() -> Result<(), odoo_dbal::DbalError> {
/// let builder = QueryBuilder::new("res.partner")?
///     .select(["name", "email"])?
///     .where_(eq("active", true))?
///     .set_max_results(Some(10))?;
/// assert_eq!(builder.method(), BuilderMethod::Select);
/// assert_eq!(builder.get_select()?, ["name", "email"]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct QueryBuilder {
    method: BuilderMethod,
    from: String,
    select: Vec<String>,
    ids: Vec<i64>,
    values: IndexMap<String, Value>,
    criteria: Option<Domain>,
    orders: IndexMap<String, OrderDirection>,
    max_results: Option<usize>,
    first_result: Option<usize>,
    context: Context,
}

impl QueryBuilder {
    /// A select builder targeting the model `from`.
    pub fn new(from: &str) -> Result<Self, DbalError> {
        Ok(Self {
            method: BuilderMethod::Select,
            from: valid_name("model", from)?,
            select: Vec::new(),
            ids: Vec::new(),
            values: IndexMap::new(),
            criteria: None,
            orders: IndexMap::new(),
            max_results: None,
            first_result: None,
            context: Context::new(),
        })
    }

    pub fn method(&self) -> BuilderMethod {
        self.method
    }

    pub fn get_from(&self) -> &str {
        &self.from
    }

    /// Retarget the builder; the rest of the state is kept.
    pub fn from(mut self, model: &str) -> Result<Self, DbalError> {
        self.from = valid_name("model", model)?;
        Ok(self)
    }

    /// Clear everything but the method and target model.
    pub fn reset(mut self) -> Self {
        self.select.clear();
        self.ids.clear();
        self.values.clear();
        self.criteria = None;
        self.orders.clear();
        self.max_results = None;
        self.first_result = None;
        self.context = Context::new();
        self
    }

    fn switch(self, method: BuilderMethod) -> Self {
        let mut builder = self.reset();
        builder.method = method;
        builder
    }

    /// Fetch records, restricted to `fields` (all fields when empty).
    pub fn select<I, S>(self, fields: I) -> Result<Self, DbalError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = self.switch(BuilderMethod::Select);
        for field in fields {
            builder = builder.add_select(field.as_ref())?;
        }
        Ok(builder)
    }

    /// Fetch record ids.
    pub fn search(self) -> Self {
        self.switch(BuilderMethod::Search)
    }

    pub fn insert(self) -> Self {
        self.switch(BuilderMethod::Insert)
    }

    pub fn update(self) -> Self {
        self.switch(BuilderMethod::Update)
    }

    pub fn delete(self) -> Self {
        self.switch(BuilderMethod::Delete)
    }

    pub fn add_select(mut self, field: &str) -> Result<Self, DbalError> {
        self.guard("add_select", &[BuilderMethod::Select])?;
        let field = valid_name("field", field)?;
        if !self.select.contains(&field) {
            self.select.push(field);
        }
        Ok(self)
    }

    pub fn get_select(&self) -> Result<&[String], DbalError> {
        self.guard("get_select", &[BuilderMethod::Select])?;
        Ok(&self.select)
    }

    /// Replace the target ids.
    pub fn set_ids<I>(mut self, ids: I) -> Result<Self, DbalError>
    where
        I: IntoIterator<Item = i64>,
    {
        self.guard("set_ids", TARGETED)?;
        self.ids.clear();
        for id in ids {
            self = self.add_id(id)?;
        }
        Ok(self)
    }

    pub fn add_id(mut self, id: i64) -> Result<Self, DbalError> {
        self.guard("add_id", TARGETED)?;
        if id <= 0 {
            return Err(DbalError::Argument(format!("Record ids must be positive, got {}", id)));
        }
        if !self.ids.contains(&id) {
            self.ids.push(id);
        }
        Ok(self)
    }

    pub fn get_ids(&self) -> &[i64] {
        &self.ids
    }

    /// Replace the whole write payload.
    pub fn set_values(mut self, values: IndexMap<String, Value>) -> Result<Self, DbalError> {
        self.guard("set_values", WRITING)?;
        self.values.clear();
        for (field, value) in values {
            self = self.set(&field, value)?;
        }
        Ok(self)
    }

    /// Set one field of the write payload.
    pub fn set(mut self, field: &str, value: impl Into<Value>) -> Result<Self, DbalError> {
        self.guard("set", WRITING)?;
        let field = valid_name("field", field)?;
        self.values.insert(field, value.into());
        Ok(self)
    }

    pub fn get_values(&self) -> &IndexMap<String, Value> {
        &self.values
    }

    /// Replace the criteria.
    pub fn where_(mut self, criteria: impl Into<Domain>) -> Result<Self, DbalError> {
        self.guard("where", READ)?;
        self.criteria = Some(criteria.into());
        Ok(self)
    }

    /// AND `criteria` with the current criteria.
    pub fn and_where(self, criteria: impl Into<Domain>) -> Result<Self, DbalError> {
        self.guard("and_where", READ)?;
        Ok(self.combine(LogicalOperator::And, criteria.into()))
    }

    /// OR `criteria` with the current criteria.
    pub fn or_where(self, criteria: impl Into<Domain>) -> Result<Self, DbalError> {
        self.guard("or_where", READ)?;
        Ok(self.combine(LogicalOperator::Or, criteria.into()))
    }

    fn combine(mut self, operator: LogicalOperator, criteria: Domain) -> Self {
        self.criteria = Some(match self.criteria.take() {
            None => criteria,
            Some(Domain::Composite(mut existing)) if existing.operator() == operator => {
                existing.add(criteria);
                Domain::Composite(existing)
            }
            Some(existing) => Domain::Composite(CompositeDomain::new(operator, vec![existing, criteria])),
        });
        self
    }

    pub fn get_where(&self) -> Option<&Domain> {
        self.criteria.as_ref()
    }

    pub fn set_orders(mut self, orders: IndexMap<String, OrderDirection>) -> Result<Self, DbalError> {
        self.guard("set_orders", READ)?;
        self.orders.clear();
        for (field, direction) in orders {
            self = self.add_order_by(&field, direction)?;
        }
        Ok(self)
    }

    /// Order by `field` only.
    pub fn order_by(mut self, field: &str, direction: OrderDirection) -> Result<Self, DbalError> {
        self.guard("order_by", READ)?;
        self.orders.clear();
        self.add_order_by(field, direction)
    }

    /// Append an order clause; an existing clause on `field` changes direction.
    pub fn add_order_by(mut self, field: &str, direction: OrderDirection) -> Result<Self, DbalError> {
        self.guard("add_order_by", READ)?;
        self.orders.insert(valid_name("field", field)?, direction);
        Ok(self)
    }

    pub fn get_orders(&self) -> &IndexMap<String, OrderDirection> {
        &self.orders
    }

    pub fn set_max_results(mut self, max_results: Option<usize>) -> Result<Self, DbalError> {
        self.guard("set_max_results", READ)?;
        self.max_results = max_results;
        Ok(self)
    }

    pub fn get_max_results(&self) -> Option<usize> {
        self.max_results
    }

    pub fn set_first_result(mut self, first_result: Option<usize>) -> Result<Self, DbalError> {
        self.guard("set_first_result", READ)?;
        self.first_result = first_result;
        Ok(self)
    }

    pub fn get_first_result(&self) -> Option<usize> {
        self.first_result
    }

    pub fn with_context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    pub fn set_context_value(mut self, key: &str, value: impl Into<JsonValue>) -> Self {
        self.context.insert(key, value.into());
        self
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    fn guard(&self, operation: &'static str, allowed: &[BuilderMethod]) -> Result<(), DbalError> {
        if allowed.contains(&self.method) {
            return Ok(());
        }
        Err(QueryError::InvalidBuilderMethod {
            operation,
            method: self.method.to_string(),
            allowed: allowed.iter().map(ToString::to_string).collect(),
        }
        .into())
    }
}

/// Trimmed `name`, rejected when it holds no letter, `_`, `.` or `-`.
fn valid_name(kind: &str, name: &str) -> Result<String, DbalError> {
    let meaningful = name
        .chars()
        .any(|c| c.is_ascii_alphabetic() || matches!(c, '_' | '.' | '-'));
    if !meaningful {
        return Err(DbalError::Argument(format!("The {} name cannot be empty", kind)));
    }
    Ok(name.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{eq, gt};
    use serde_json::json;

    fn builder() -> QueryBuilder {
        QueryBuilder::new("res.partner").unwrap()
    }

    fn assert_state_error(result: Result<QueryBuilder, DbalError>, operation: &str) {
        match result {
            Err(DbalError::Query(QueryError::InvalidBuilderMethod { operation: op, .. })) => {
                assert_eq!(op, operation)
            }
            other => panic!("expected a builder state error, got {other:?}"),
        }
    }

    #[test]
    fn test_names_are_validated() {
        assert!(QueryBuilder::new("  ").is_err());
        assert!(QueryBuilder::new("123").is_err());
        assert!(QueryBuilder::new("res.partner").is_ok());
        assert!(builder().add_select("%%").is_err());
    }

    #[test]
    fn test_select_dedups_fields() {
        let b = builder().select(["name", "email", "name"]).unwrap();
        assert_eq!(b.get_select().unwrap(), ["name", "email"]);
    }

    #[test]
    fn test_set_values_rejected_in_search_state() {
        assert_state_error(builder().search().set_values(IndexMap::new()), "set_values");
    }

    #[test]
    fn test_set_ids_rejected_in_insert_state() {
        assert_state_error(builder().insert().set_ids([1]), "set_ids");
    }

    #[test]
    fn test_guard_table() {
        assert_state_error(builder().search().add_select("name"), "add_select");
        assert!(builder().search().get_select().is_err());
        assert_state_error(builder().insert().where_(eq("a", 1)), "where");
        assert_state_error(builder().update().order_by("name", OrderDirection::Asc), "order_by");
        assert_state_error(builder().delete().set_max_results(Some(1)), "set_max_results");
        assert_state_error(builder().select(["name"]).unwrap().set("name", "x"), "set");
        assert!(builder().update().set("name", "x").unwrap().set_ids([1]).is_ok());
    }

    #[test]
    fn test_state_error_lists_allowed_methods() {
        let err = builder().search().set_values(IndexMap::new()).unwrap_err();
        assert!(err.to_string().contains("insert, update"));
    }

    #[test]
    fn test_ids_must_be_positive_and_are_deduplicated() {
        let b = builder().delete().set_ids([3, 1, 3, 2]).unwrap();
        assert_eq!(b.get_ids(), [3, 1, 2]);
        assert!(matches!(builder().delete().add_id(0), Err(DbalError::Argument(_))));
        assert!(matches!(builder().update().set_ids([4, -1]), Err(DbalError::Argument(_))));
    }

    #[test]
    fn test_switching_method_resets_state() {
        let b = builder()
            .select(["name"])
            .unwrap()
            .where_(eq("active", true))
            .unwrap()
            .set_max_results(Some(5))
            .unwrap()
            .set_context_value("lang", "fr_FR")
            .search();
        assert_eq!(b.method(), BuilderMethod::Search);
        assert!(b.get_where().is_none());
        assert_eq!(b.get_max_results(), None);
        assert!(b.context().is_empty());
        assert_eq!(b.get_from(), "res.partner");
    }

    #[test]
    fn test_and_or_where_composition() {
        let b = builder()
            .search()
            .and_where(eq("a", 1))
            .unwrap()
            .and_where(eq("b", 2))
            .unwrap()
            .and_where(eq("c", 3))
            .unwrap()
            .or_where(gt("d", 4))
            .unwrap();
        assert_eq!(
            b.get_where().unwrap().to_array(),
            json!(["|", "&", "&", ["a", "=", 1], ["b", "=", 2], ["c", "=", 3], ["d", ">", 4]])
        );
    }

    #[test]
    fn test_orders_keep_insertion_order() {
        let b = builder()
            .order_by("name", OrderDirection::Asc)
            .unwrap()
            .add_order_by("id", OrderDirection::Desc)
            .unwrap()
            .add_order_by("name", OrderDirection::Desc)
            .unwrap();
        let orders: Vec<(&str, OrderDirection)> =
            b.get_orders().iter().map(|(k, v)| (k.as_str(), *v)).collect();
        assert_eq!(orders, vec![("name", OrderDirection::Desc), ("id", OrderDirection::Desc)]);

        let replaced = b.order_by("email", OrderDirection::Asc).unwrap();
        assert_eq!(replaced.get_orders().len(), 1);
    }
}
