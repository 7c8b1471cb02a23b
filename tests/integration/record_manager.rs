//! Integration tests for RecordManager record helpers and schema caching

use indexmap::IndexMap;
use odoo_dbal::domain::{eq, in_};
use odoo_dbal::operation::CollectionOperation;
use odoo_dbal::schema::{MemoryCache, MetadataCache};
use odoo_dbal::test_helpers::{partner_fixture, MockExecutor};
use odoo_dbal::{DbalConfig, DbalError, QueryError, RecordManager, Value};
use serde_json::json;
use std::sync::Arc;

fn setup() -> (MockExecutor, RecordManager) {
    let mock = partner_fixture();
    let manager = RecordManager::in_memory(Arc::new(mock.clone()));
    (mock, manager)
}

fn values(pairs: &[(&str, Value)]) -> IndexMap<String, Value> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

#[test]
fn test_find_reads_requested_fields() {
    let (mock, manager) = setup();
    let rows = manager.find("res.partner", &[2, 1], &["name", "email"]).unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows.scalars(Some("name")).unwrap().len(), 2);
    let jane = rows.values().find(|row| row["id"] == Value::Int(2)).unwrap();
    assert_eq!(jane["email"], Value::Null);

    let read = mock.calls().into_iter().find(|call| call.method == "read").unwrap();
    assert_eq!(read.params, vec![json!([2, 1])]);
    assert_eq!(read.options.get("fields"), Some(&json!(["name", "email"])));
}

#[test]
fn test_find_without_ids_fails() {
    let (_, manager) = setup();
    assert!(matches!(
        manager.find("res.partner", &[], &[]),
        Err(DbalError::Query(QueryError::MissingIds { .. }))
    ));
}

#[test]
fn test_create_update_delete_round() {
    let (mock, manager) = setup();

    let id = manager
        .create("res.partner", values(&[("name", Value::from("Globex")), ("active", Value::from(true))]))
        .unwrap();
    assert_eq!(id, 4);
    assert_eq!(manager.count("res.partner", Some(eq("active", true).into())).unwrap(), 3);

    assert!(manager
        .update("res.partner", &[1, 2, 3], values(&[("name", Value::from("x"))]))
        .unwrap());
    let write = mock.calls().into_iter().find(|call| call.method == "write").unwrap();
    assert_eq!(write.params, vec![json!([1, 2, 3]), json!({"name": "x"})]);

    assert!(manager.delete("res.partner", &[id]).unwrap());
    assert_eq!(manager.count("res.partner", None).unwrap(), 3);
}

#[test]
fn test_delete_requires_ids() {
    let (mock, manager) = setup();
    let err = manager.delete("res.partner", &[]).unwrap_err();
    assert_eq!(
        err,
        DbalError::Query(QueryError::MissingIds {
            method: "unlink".to_string()
        })
    );
    assert!(mock.calls().iter().all(|call| call.method != "unlink"));
}

#[test]
fn test_update_rejects_non_positive_ids() {
    let (_, manager) = setup();
    let err = manager
        .update("res.partner", &[0], values(&[("name", Value::from("x"))]))
        .unwrap_err();
    assert!(matches!(err, DbalError::Argument(_)));
}

#[test]
fn test_collection_operations_go_out_as_commands() {
    let (mock, manager) = setup();
    manager
        .update(
            "res.partner",
            &[1],
            values(&[(
                "category_id",
                Value::from(vec![Value::from(CollectionOperation::add(2)), Value::from(CollectionOperation::clear())]),
            )]),
        )
        .unwrap();

    let write = mock.calls().into_iter().find(|call| call.method == "write").unwrap();
    assert_eq!(write.params[1], json!({"category_id": [[4, 2, null], [5, 0, null]]}));
}

#[test]
fn test_count_with_membership() {
    let (_, manager) = setup();
    assert_eq!(manager.count("res.partner", Some(in_("id", vec![1, 3]).into())).unwrap(), 2);
}

#[test]
fn test_schema_is_fetched_once_per_cache() {
    let mock = partner_fixture();
    let cache: Arc<dyn MetadataCache> = Arc::new(MemoryCache::new());
    let first = RecordManager::new(Arc::new(mock.clone()), Arc::clone(&cache), DbalConfig::default());
    first.count("res.partner", None).unwrap();
    assert!(cache.get_item("dbal.schema.model.res.partner").is_hit());
    assert!(cache.get_item("dbal.schema.models").is_hit());

    mock.clear_calls();
    let second = RecordManager::new(Arc::new(mock.clone()), cache, DbalConfig::default());
    second.count("res.partner", None).unwrap();
    let models: Vec<String> = mock.calls().into_iter().map(|call| call.model).collect();
    assert_eq!(models, vec!["res.partner"]);
}

#[test]
fn test_cache_prefix_from_config() {
    let mock = partner_fixture();
    let cache: Arc<dyn MetadataCache> = Arc::new(MemoryCache::new());
    let config = DbalConfig {
        cache_prefix: "erp".to_string(),
        ..DbalConfig::default()
    };
    let manager = RecordManager::new(Arc::new(mock), Arc::clone(&cache), config);
    manager.schema().get_model("res.country").unwrap();
    assert!(cache.get_item("erp.schema.model.res.country").is_hit());
    assert!(!cache.get_item("dbal.schema.model.res.country").is_hit());
}
