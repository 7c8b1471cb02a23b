//! Test doubles for the RPC boundary.
//!
//! [`MockExecutor`] records every `execute_kw` call and answers it from, in
//! order: a user supplied handler, then a set of in-memory tables. Tables
//! understand `search_read`, `search`, `search_count`, `read`, `create`,
//! `write` and `unlink` with `=`, `!=`, `in` and `not in` leaves joined by `&`
//! (other leaves and operators match everything).
//!
//! [`partner_fixture`] serves the metadata of `res.partner`, `res.country` and
//! `res.partner.category` plus three partner records.

use crate::executor::{RpcError, RpcExecutor};
use serde_json::{json, Map, Value as JsonValue};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// One captured `execute_kw` call
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub model: String,
    pub method: String,
    pub params: Vec<JsonValue>,
    pub options: Map<String, JsonValue>,
}

impl RecordedCall {
    /// `options[key]` as an unsigned integer.
    pub fn option_usize(&self, key: &str) -> Option<usize> {
        self.options
            .get(key)
            .and_then(JsonValue::as_u64)
            .map(|v| v as usize)
    }
}

type Handler = dyn Fn(&RecordedCall) -> Option<Result<JsonValue, RpcError>> + Send + Sync;

/// Recording executor for tests
#[derive(Clone, Default)]
pub struct MockExecutor {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    tables: Arc<Mutex<HashMap<String, Vec<JsonValue>>>>,
    handler: Option<Arc<Handler>>,
}

impl MockExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer calls through `handler` first; `None` falls back to the tables.
    pub fn with_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&RecordedCall) -> Option<Result<JsonValue, RpcError>> + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }

    /// Replace the records served for `model`.
    pub fn with_table(self, model: &str, records: Vec<JsonValue>) -> Self {
        self.lock_tables().insert(model.to_string(), records);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    /// Calls made against `model`, in order.
    pub fn calls_for(&self, model: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|call| call.model == model)
            .collect()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap_or_else(|p| p.into_inner()).clear();
    }

    pub fn table(&self, model: &str) -> Vec<JsonValue> {
        self.lock_tables().get(model).cloned().unwrap_or_default()
    }

    fn lock_tables(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<JsonValue>>> {
        self.tables.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn serve(&self, call: &RecordedCall) -> Result<JsonValue, RpcError> {
        let mut tables = self.lock_tables();
        let Some(records) = tables.get_mut(&call.model) else {
            return Err(RpcError::Remote {
                code: 404,
                message: format!("Object {} doesn't exist", call.model),
            });
        };
        let domain = call.params.first().cloned().unwrap_or(JsonValue::Null);

        match call.method.as_str() {
            "search_read" | "search" | "search_count" => {
                let matching: Vec<&JsonValue> = records.iter().filter(|r| matches_domain(r, &domain)).collect();
                if call.method == "search_count" {
                    return Ok(json!(matching.len()));
                }
                let offset = call.option_usize("offset").unwrap_or(0);
                let limit = call.option_usize("limit").unwrap_or(usize::MAX);
                let page = matching.into_iter().skip(offset).take(limit);
                if call.method == "search" {
                    Ok(JsonValue::Array(page.map(|r| r["id"].clone()).collect()))
                } else {
                    Ok(JsonValue::Array(page.map(|r| project(r, call.options.get("fields"))).collect()))
                }
            }
            "read" => {
                let ids = ids_of(call.params.first());
                Ok(JsonValue::Array(
                    records
                        .iter()
                        .filter(|r| r["id"].as_i64().is_some_and(|id| ids.contains(&id)))
                        .map(|r| project(r, call.options.get("fields")))
                        .collect(),
                ))
            }
            "create" => {
                let next = records.iter().filter_map(|r| r["id"].as_i64()).max().unwrap_or(0) + 1;
                let mut record = call.params.first().cloned().unwrap_or_else(|| json!({}));
                if let Some(map) = record.as_object_mut() {
                    map.insert("id".to_string(), json!(next));
                }
                records.push(record);
                Ok(json!(next))
            }
            "write" => {
                let ids = ids_of(call.params.first());
                let values = call.params.get(1).and_then(JsonValue::as_object).cloned().unwrap_or_default();
                for record in records.iter_mut() {
                    let hit = record["id"].as_i64().is_some_and(|id| ids.contains(&id));
                    if let (true, Some(map)) = (hit, record.as_object_mut()) {
                        map.extend(values.clone());
                    }
                }
                Ok(json!(true))
            }
            "unlink" => {
                let ids = ids_of(call.params.first());
                records.retain(|r| !r["id"].as_i64().is_some_and(|id| ids.contains(&id)));
                Ok(json!(true))
            }
            other => Err(RpcError::Remote {
                code: 400,
                message: format!("Unsupported method {}", other),
            }),
        }
    }
}

impl std::fmt::Debug for MockExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockExecutor")
            .field("calls", &self.calls().len())
            .finish_non_exhaustive()
    }
}

impl RpcExecutor for MockExecutor {
    fn execute_kw(
        &self,
        model: &str,
        method: &str,
        params: &[JsonValue],
        options: &Map<String, JsonValue>,
    ) -> Result<JsonValue, RpcError> {
        let call = RecordedCall {
            model: model.to_string(),
            method: method.to_string(),
            params: params.to_vec(),
            options: options.clone(),
        };
        self.calls
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(call.clone());

        if let Some(answer) = self.handler.as_ref().and_then(|handler| handler(&call)) {
            return answer;
        }
        self.serve(&call)
    }
}

fn ids_of(value: Option<&JsonValue>) -> Vec<i64> {
    match value {
        Some(JsonValue::Array(items)) => items.iter().filter_map(JsonValue::as_i64).collect(),
        Some(other) => other.as_i64().into_iter().collect(),
        None => Vec::new(),
    }
}

fn project(record: &JsonValue, fields: Option<&JsonValue>) -> JsonValue {
    let (Some(fields), Some(map)) = (fields.and_then(JsonValue::as_array), record.as_object()) else {
        return record.clone();
    };
    let mut out = Map::new();
    out.insert("id".to_string(), record["id"].clone());
    for name in fields.iter().filter_map(JsonValue::as_str) {
        if let Some(value) = map.get(name) {
            out.insert(name.to_string(), value.clone());
        }
    }
    JsonValue::Object(out)
}

/// Many2one values come back as `[id, display_name]`; compare on the id.
fn comparable(value: &JsonValue) -> &JsonValue {
    match value {
        JsonValue::Array(pair) if pair.len() == 2 && pair[0].is_i64() => &pair[0],
        other => other,
    }
}

fn matches_domain(record: &JsonValue, domain: &JsonValue) -> bool {
    let Some(items) = domain.as_array() else {
        return true;
    };
    if items.len() == 3 && items[0].is_string() && items[0] != "&" && items[0] != "|" && items[0] != "!" {
        return matches_leaf(record, items);
    }
    items.iter().all(|item| match item.as_array() {
        Some(leaf) if leaf.len() == 3 => matches_leaf(record, leaf),
        Some(_) => matches_domain(record, item),
        None => true,
    })
}

fn matches_leaf(record: &JsonValue, leaf: &[JsonValue]) -> bool {
    let (Some(field), Some(op)) = (leaf[0].as_str(), leaf[1].as_str()) else {
        return true;
    };
    let actual = comparable(&record[field]);
    let expected = &leaf[2];
    let contains = || expected.as_array().is_some_and(|items| items.contains(actual));
    match op {
        "=" => actual == expected,
        "!=" => actual != expected,
        "in" => contains(),
        "not in" => !contains(),
        _ => true,
    }
}

fn model_record(id: i64, model: &str, name: &str) -> JsonValue {
    json!({"id": id, "model": model, "name": name, "transient": false})
}

fn field_record(id: i64, model_id: i64, name: &str, ttype: &str, label: &str) -> JsonValue {
    json!({
        "id": id,
        "model_id": [model_id, "model"],
        "name": name,
        "ttype": ttype,
        "field_description": label,
        "required": false,
        "readonly": false,
        "size": false,
        "relation": false,
        "relation_field": false,
        "selection": false,
        "selection_ids": [],
    })
}

fn relation(mut record: JsonValue, target: &str, inverse: Option<&str>) -> JsonValue {
    record["relation"] = json!(target);
    if let Some(inverse) = inverse {
        record["relation_field"] = json!(inverse);
    }
    record
}

/// Metadata plus sample data for partners, countries and partner tags.
///
/// `res.partner.user_id` targets `res.users`, which the fixture does not
/// declare, so traversing it fails. The `type` selection is served through
/// `ir.model.fields.selection`, `company_type` through the legacy literal.
pub fn partner_fixture() -> MockExecutor {
    let models = vec![
        model_record(80, "res.partner", "Contact"),
        model_record(81, "res.country", "Country"),
        model_record(82, "res.partner.category", "Partner Tags"),
    ];

    let mut kind = field_record(9, 80, "type", "selection", "Address Type");
    kind["selection_ids"] = json!([1, 2]);
    let mut company_type = field_record(10, 80, "company_type", "selection", "Company Type");
    company_type["selection"] = json!("[('person', 'Individual'), ('company', 'Company')]");
    let mut name = field_record(2, 80, "name", "char", "Name");
    name["required"] = json!(true);
    let mut id = field_record(1, 80, "id", "integer", "ID");
    id["readonly"] = json!(true);

    let fields = vec![
        id,
        name,
        field_record(3, 80, "active", "boolean", "Active"),
        field_record(4, 80, "email", "char", "Email"),
        field_record(5, 80, "date", "date", "Date"),
        field_record(6, 80, "create_date", "datetime", "Created on"),
        field_record(7, 80, "credit_limit", "monetary", "Credit Limit"),
        field_record(8, 80, "color", "integer", "Color Index"),
        kind,
        company_type,
        field_record(11, 80, "comment", "html", "Notes"),
        field_record(12, 80, "image_1920", "binary", "Image"),
        relation(field_record(13, 80, "country_id", "many2one", "Country"), "res.country", None),
        relation(field_record(14, 80, "parent_id", "many2one", "Related Company"), "res.partner", None),
        relation(
            field_record(15, 80, "child_ids", "one2many", "Contact"),
            "res.partner",
            Some("parent_id"),
        ),
        relation(
            field_record(16, 80, "category_id", "many2many", "Tags"),
            "res.partner.category",
            None,
        ),
        relation(field_record(17, 80, "user_id", "many2one", "Salesperson"), "res.users", None),
        field_record(20, 81, "id", "integer", "ID"),
        field_record(21, 81, "name", "char", "Country Name"),
        field_record(22, 81, "code", "char", "Country Code"),
        field_record(30, 82, "id", "integer", "ID"),
        field_record(31, 82, "name", "char", "Tag Name"),
        field_record(32, 82, "color", "integer", "Color"),
    ];

    let selections = vec![
        json!({"id": 1, "field_id": [9, "type"], "value": "contact", "name": "Contact"}),
        json!({"id": 2, "field_id": [9, "type"], "value": "invoice", "name": "Invoice Address"}),
    ];

    let partners = vec![
        json!({
            "id": 1, "name": "Acme", "active": true, "email": "info@acme.test",
            "date": "2024-01-15", "create_date": "2024-01-15 10:00:00", "credit_limit": 1500.0,
            "color": 3, "type": "contact", "company_type": "company", "comment": "<p>Key account</p>",
            "image_1920": false, "country_id": [1, "Belgium"], "parent_id": false,
            "child_ids": [2], "category_id": [1, 2], "user_id": false,
        }),
        json!({
            "id": 2, "name": "Jane Doe", "active": true, "email": false,
            "date": false, "create_date": "2024-02-01 08:30:00", "credit_limit": 0.0,
            "color": 0, "type": "invoice", "company_type": "person", "comment": false,
            "image_1920": false, "country_id": [1, "Belgium"], "parent_id": [1, "Acme"],
            "child_ids": [], "category_id": [], "user_id": false,
        }),
        json!({
            "id": 3, "name": "Old Co", "active": false, "email": false,
            "date": false, "create_date": "2020-06-30 17:45:00", "credit_limit": 0.0,
            "color": 0, "type": "contact", "company_type": "company", "comment": false,
            "image_1920": false, "country_id": false, "parent_id": false,
            "child_ids": [], "category_id": [], "user_id": false,
        }),
    ];

    MockExecutor::new()
        .with_table("ir.model", models)
        .with_table("ir.model.fields", fields)
        .with_table("ir.model.fields.selection", selections)
        .with_table("res.country", vec![json!({"id": 1, "name": "Belgium", "code": "BE"})])
        .with_table(
            "res.partner.category",
            vec![json!({"id": 1, "name": "VIP", "color": 2}), json!({"id": 2, "name": "Supplier", "color": 5})],
        )
        .with_table("res.partner", partners)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_calls_and_serves_tables() {
        let mock = partner_fixture();
        let rows = mock
            .execute_kw("res.partner", "search_read", &[json!([["active", "=", true]])], &Map::new())
            .unwrap();
        assert_eq!(rows.as_array().unwrap().len(), 2);
        assert_eq!(mock.calls().len(), 1);
        assert_eq!(mock.calls()[0].method, "search_read");
    }

    #[test]
    fn test_many2one_filter_compares_ids() {
        let mock = partner_fixture();
        let ids = mock
            .execute_kw("res.partner", "search", &[json!([["parent_id", "=", 1]])], &Map::new())
            .unwrap();
        assert_eq!(ids, json!([2]));
    }

    #[test]
    fn test_handler_takes_precedence() {
        let mock = MockExecutor::new().with_handler(|call| {
            (call.method == "search_count").then(|| Ok(json!(250)))
        });
        assert_eq!(mock.execute_kw("x", "search_count", &[], &Map::new()).unwrap(), json!(250));
        assert!(mock.execute_kw("x", "search", &[], &Map::new()).is_err());
    }

    #[test]
    fn test_create_write_unlink() {
        let mock = partner_fixture();
        let id = mock
            .execute_kw("res.partner", "create", &[json!({"name": "New"})], &Map::new())
            .unwrap();
        assert_eq!(id, json!(4));
        mock.execute_kw("res.partner", "write", &[json!([4]), json!({"name": "Renamed"})], &Map::new())
            .unwrap();
        assert!(mock.table("res.partner").iter().any(|r| r["name"] == "Renamed"));
        mock.execute_kw("res.partner", "unlink", &[json!([4])], &Map::new()).unwrap();
        assert_eq!(mock.table("res.partner").len(), 3);
    }
}
