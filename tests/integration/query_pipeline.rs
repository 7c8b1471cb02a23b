//! Integration tests for the builder → factory → query → result pipeline
//!
//! Everything runs against `partner_fixture()`, which serves the partner
//! metadata and records from memory and records every remote call.

use odoo_dbal::domain::{and_x, eq, in_, like, not_x, Domain};
use odoo_dbal::schema::MemoryCache;
use odoo_dbal::test_helpers::{partner_fixture, MockExecutor};
use odoo_dbal::{
    Context, DbalConfig, DbalError, QueryBuilder, QueryMethod, RecordManager, SchemaError, Value,
};
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;

fn setup() -> (MockExecutor, RecordManager) {
    let mock = partner_fixture();
    let manager = RecordManager::new(
        Arc::new(mock.clone()),
        Arc::new(MemoryCache::new()),
        DbalConfig::default(),
    );
    (mock, manager)
}

// ============================================================================
// Compilation
// ============================================================================

#[test]
fn test_select_sends_search_read_with_fields_and_limit() {
    let (mock, manager) = setup();
    let builder = manager
        .create_query_builder("res.partner")
        .unwrap()
        .select(["name"])
        .unwrap()
        .where_(eq("active", true))
        .unwrap()
        .set_max_results(Some(1))
        .unwrap();

    let query = manager.create_query(&builder).unwrap();
    mock.clear_calls();
    let row = query.get_single_result().unwrap();

    let calls = mock.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].model, "res.partner");
    assert_eq!(calls[0].method, "search_read");
    assert_eq!(calls[0].params, vec![json!([["active", "=", true]])]);
    assert_eq!(JsonValue::Object(calls[0].options.clone()), json!({"fields": ["name"], "limit": 1}));
    assert_eq!(row["name"], Value::from("Acme"));
}

#[test]
fn test_nested_domain_is_prefix_encoded() {
    let (mock, manager) = setup();
    let criteria = and_x([
        Domain::from(like("name", "Ac", false, false)),
        not_x([Domain::from(in_("color", vec![1, 2]))]).into(),
    ]);
    let builder = manager
        .create_query_builder("res.partner")
        .unwrap()
        .search()
        .where_(criteria)
        .unwrap();

    manager.create_query(&builder).unwrap().execute().unwrap();

    let search = mock
        .calls_for("res.partner")
        .into_iter()
        .find(|call| call.method == "search")
        .unwrap();
    assert_eq!(
        search.params,
        vec![json!(["&", ["name", "ilike", "Ac"], "!", ["color", "in", [1, 2]]])]
    );
}

#[test]
fn test_dotted_criteria_resolve_through_associations() {
    let (_, manager) = setup();
    let builder = manager
        .create_query_builder("res.partner")
        .unwrap()
        .where_(eq("country_id.code", "BE"))
        .unwrap();
    let query = manager.create_query(&builder).unwrap();
    assert_eq!(query.parameters(), [json!([["country_id.code", "=", "BE"]])]);

    let broken = manager
        .create_query_builder("res.partner")
        .unwrap()
        .where_(eq("user_id.login", "admin"))
        .unwrap();
    let err = manager.create_query(&broken).unwrap_err();
    assert!(matches!(err, DbalError::Schema(SchemaError::TargetModelNotFound { .. })));
}

#[test]
fn test_values_are_converted_per_field_type() {
    let (mock, manager) = setup();
    let builder = QueryBuilder::new("res.partner")
        .unwrap()
        .insert()
        .set("name", "  Padded  ")
        .unwrap()
        .set("credit_limit", 12)
        .unwrap()
        .set("image_1920", "Hello world!")
        .unwrap()
        .set("company_type", "person")
        .unwrap();

    let id = manager.create_query(&builder).unwrap().execute().unwrap();
    assert_eq!(id, json!(4));

    let create = mock
        .calls()
        .into_iter()
        .find(|call| call.method == "create")
        .unwrap();
    assert_eq!(create.params[0]["credit_limit"], json!(12.0));
    assert_eq!(create.params[0]["image_1920"], json!("SGVsbG8gd29ybGQh"));
    assert_eq!(create.params[0]["company_type"], json!("person"));
}

// ============================================================================
// Results
// ============================================================================

#[test]
fn test_rows_are_normalized() {
    let (_, manager) = setup();
    let builder = manager
        .create_query_builder("res.partner")
        .unwrap()
        .select(["name", "date", "create_date", "country_id"])
        .unwrap()
        .where_(eq("id", 1))
        .unwrap();

    let row = manager.create_query(&builder).unwrap().get_single_result().unwrap();
    assert_eq!(row["date"].to_string(), "2024-01-15");
    assert_eq!(row["create_date"].to_string(), "2024-01-15 10:00:00");
    assert_eq!(row["country_id"], Value::from(json!([1, "Belgium"])));
}

#[test]
fn test_context_timezone_applies_to_datetimes() {
    let (_, manager) = setup();
    let builder = manager
        .create_query_builder("res.partner")
        .unwrap()
        .select(["create_date"])
        .unwrap()
        .where_(eq("id", 1))
        .unwrap()
        .with_context(Context::with_timezone("+02:00"));

    let row = manager.create_query(&builder).unwrap().get_single_result().unwrap();
    match &row["create_date"] {
        Value::DateTime(dt) => {
            assert_eq!(dt.offset().local_minus_utc(), 2 * 3600);
            assert_eq!(row["create_date"].to_string(), "2024-01-15 10:00:00");
        }
        other => panic!("expected a datetime, got {:?}", other),
    }
}

#[test]
fn test_count_queries() {
    let (_, manager) = setup();
    let all = manager.create_query(&QueryBuilder::new("res.partner").unwrap()).unwrap();
    assert_eq!(all.count().unwrap(), 3);

    let builder = QueryBuilder::new("res.partner")
        .unwrap()
        .search()
        .where_(eq("active", false))
        .unwrap();
    let inactive = manager.create_query(&builder).unwrap();
    assert_eq!(inactive.method(), QueryMethod::Search);
    assert_eq!(inactive.count().unwrap(), 1);
    assert_eq!(inactive.get_single_scalar_result().unwrap().as_i64(), Some(3));
}

#[test]
fn test_remote_faults_surface_as_rpc_errors() {
    let (_, manager) = setup();
    let err = manager.create_query(&QueryBuilder::new("res.users").unwrap()).unwrap_err();
    assert!(matches!(err, DbalError::Schema(SchemaError::ModelNotFound { .. })));

    let failing = MockExecutor::new().with_handler(|_| {
        Some(Err(odoo_dbal::RpcError::Transport("connection refused".to_string())))
    });
    let manager = RecordManager::in_memory(Arc::new(failing));
    let err = manager.create_query(&QueryBuilder::new("res.partner").unwrap()).unwrap_err();
    assert!(matches!(err, DbalError::Rpc(_)));
}
