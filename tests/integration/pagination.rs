//! Integration tests for Paginator and LazyResult
//!
//! `res.partner` pretends to hold `total` records: `search_count` answers the
//! total and `search_read` serves synthetic rows for the requested window.
//! Metadata still comes from the partner fixture.

use odoo_dbal::domain::eq;
use odoo_dbal::test_helpers::{partner_fixture, MockExecutor, RecordedCall};
use odoo_dbal::{DbalError, Query, QueryBuilder, RecordManager, RpcError, Value};
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;

/// Serve `total` partners, but only `available` rows before running dry.
fn paged_partners(total: usize, available: usize) -> MockExecutor {
    partner_fixture().with_handler(move |call: &RecordedCall| {
        if call.model != "res.partner" {
            return None;
        }
        match call.method.as_str() {
            "search_count" => Some(Ok(json!(total))),
            "search_read" | "search" => {
                let offset = call.option_usize("offset").unwrap_or(0);
                let limit = call.option_usize("limit").unwrap_or(usize::MAX);
                let end = available.min(offset.saturating_add(limit));
                let rows: Vec<JsonValue> = (offset..end)
                    .map(|i| {
                        let id = i + 1;
                        if call.method == "search" {
                            json!(id)
                        } else {
                            json!({"id": id, "name": format!("Partner {}", id)})
                        }
                    })
                    .collect();
                Some(Ok(JsonValue::Array(rows)))
            }
            _ => None,
        }
    })
}

fn select_query(mock: &MockExecutor) -> Query {
    let manager = RecordManager::in_memory(Arc::new(mock.clone()));
    let builder = QueryBuilder::new("res.partner")
        .unwrap()
        .select(["name"])
        .unwrap()
        .where_(eq("active", true))
        .unwrap();
    manager.create_query(&builder).unwrap()
}

fn page_fetches(mock: &MockExecutor) -> Vec<(usize, usize)> {
    mock.calls_for("res.partner")
        .into_iter()
        .filter(|call| call.method == "search_read")
        .map(|call| (call.option_usize("offset").unwrap_or(0), call.option_usize("limit").unwrap_or(0)))
        .collect()
}

#[test]
fn test_pages_follow_the_initial_count() {
    let mock = paged_partners(250, 250);
    let query = select_query(&mock);
    mock.clear_calls();

    let sizes: Vec<usize> = query
        .paginate(Some(100), None)
        .unwrap()
        .pages()
        .map(|page| page.unwrap().len())
        .collect();

    assert_eq!(sizes, vec![100, 100, 50]);
    assert_eq!(page_fetches(&mock), vec![(0, 100), (100, 100), (200, 100)]);
    let counts = mock.calls().iter().filter(|call| call.method == "search_count").count();
    assert_eq!(counts, 1);
}

#[test]
fn test_iteration_stops_at_first_empty_page() {
    let mock = paged_partners(250, 100);
    let query = select_query(&mock);
    mock.clear_calls();

    let rows: Vec<Value> = query.iterate(Some(100)).unwrap().map(Result::unwrap).collect();

    assert_eq!(rows.len(), 100);
    assert_eq!(page_fetches(&mock), vec![(0, 100), (100, 100)]);
}

#[test]
fn test_lazy_rows_are_normalized_records() {
    let mock = paged_partners(5, 5);
    let query = select_query(&mock);

    let names: Vec<String> = query
        .iterate(Some(2))
        .unwrap()
        .map(|row| match row.unwrap() {
            Value::Map(record) => record["name"].to_string(),
            other => panic!("expected a record, got {:?}", other),
        })
        .collect();

    assert_eq!(names, vec!["Partner 1", "Partner 2", "Partner 3", "Partner 4", "Partner 5"]);
}

#[test]
fn test_zero_count_fetches_nothing() {
    let mock = paged_partners(0, 0);
    let query = select_query(&mock);
    mock.clear_calls();

    assert_eq!(query.iterate(None).unwrap().count(), 0);
    assert!(page_fetches(&mock).is_empty());
}

#[test]
fn test_num_items_is_cached() {
    let mock = paged_partners(250, 250);
    let query = select_query(&mock);
    mock.clear_calls();

    let mut paginator = query.paginate(Some(100), None).unwrap();
    assert_eq!(paginator.num_items().unwrap(), 250);
    assert_eq!(paginator.num_items().unwrap(), 250);
    assert_eq!(paginator.num_pages().unwrap(), 3);
    assert_eq!(mock.calls().len(), 1);
}

#[test]
fn test_fetch_page_is_one_indexed() {
    let mock = paged_partners(250, 250);
    let query = select_query(&mock);

    let paginator = query.paginate(Some(100), None).unwrap();
    let third = paginator.fetch_page(3).unwrap();
    assert_eq!(third.len(), 50);
    let first_id = match third.first() {
        Some(Value::Map(record)) => record["id"].clone(),
        other => panic!("unexpected page content {:?}", other),
    };
    assert_eq!(first_id, Value::Int(201));
}

#[test]
fn test_search_queries_yield_ids() {
    let mock = paged_partners(3, 3);
    let manager = RecordManager::in_memory(Arc::new(mock));
    let query = manager
        .create_query(&QueryBuilder::new("res.partner").unwrap().search())
        .unwrap();

    let ids: Vec<Value> = query.iterate(Some(2)).unwrap().map(Result::unwrap).collect();
    assert_eq!(ids, vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
}

#[test]
fn test_original_query_is_untouched() {
    let mock = paged_partners(250, 250);
    let query = select_query(&mock);
    let before = query.duplicate();

    let _ = query.paginate(Some(100), None).unwrap().pages().count();
    assert_eq!(query, before);
    assert!(query.options().get("offset").is_none());
}

#[test]
fn test_errors_end_iteration() {
    let mock = partner_fixture().with_handler(|call: &RecordedCall| {
        (call.model == "res.partner" && call.method == "search_count")
            .then(|| Err(RpcError::Transport("timeout".to_string())))
    });
    let query = select_query(&mock);

    let mut pages = query.paginate(Some(10), None).unwrap().pages();
    assert!(matches!(pages.next(), Some(Err(DbalError::Rpc(_)))));
    assert!(pages.next().is_none());
}

#[test]
fn test_invalid_paginators() {
    let mock = paged_partners(1, 1);
    let query = select_query(&mock);
    assert!(matches!(query.paginate(Some(0), None), Err(DbalError::Argument(_))));

    let manager = RecordManager::in_memory(Arc::new(mock));
    let delete = QueryBuilder::new("res.partner").unwrap().delete().add_id(1).unwrap();
    let err = manager.create_query(&delete).unwrap().iterate(None).unwrap_err();
    assert!(matches!(err, DbalError::Query(_)));
}

#[test]
fn test_out_of_range_page_is_rejected() {
    let mock = paged_partners(250, 250);
    let query = select_query(&mock);
    mock.clear_calls();

    let paginator = query.paginate(Some(100), None).unwrap();
    let err = paginator.fetch_page(usize::MAX / 50).unwrap_err();
    assert!(matches!(err, DbalError::Argument(_)));
    assert!(page_fetches(&mock).is_empty());
}
