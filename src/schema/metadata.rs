//! Model and field metadata.
//!
//! Both structs are built once from `ir.model` / `ir.model.fields` records and
//! never mutated afterwards. They round-trip through JSON so that cache
//! backends can persist them.

use super::selection::Choice;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Column types referencing exactly one record of another model
pub const SINGLE_ASSOCIATION_TYPES: [&str; 1] = ["many2one"];
/// Column types referencing a set of records of another model
pub const MULTIPLE_ASSOCIATION_TYPES: [&str; 2] = ["one2many", "many2many"];

/// Description of one field (column) of a remote model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMetadata {
    pub id: i64,
    pub name: String,
    /// Remote type name (`ttype`), the key into the type registry
    pub column_type: String,
    pub required: bool,
    pub read_only: bool,
    pub display_name: Option<String>,
    pub size: Option<i64>,
    pub selection: Option<Vec<Choice>>,
    pub target_model: Option<String>,
    pub target_field: Option<String>,
}

impl FieldMetadata {
    /// Minimal field description, mostly useful for tests and fixtures.
    pub fn new(id: i64, name: impl Into<String>, column_type: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            column_type: column_type.into(),
            required: false,
            read_only: false,
            display_name: None,
            size: None,
            selection: None,
            target_model: None,
            target_field: None,
        }
    }

    pub fn with_target(mut self, model: impl Into<String>, field: Option<&str>) -> Self {
        self.target_model = Some(model.into());
        self.target_field = field.map(str::to_string);
        self
    }

    pub fn with_selection(mut self, choices: Vec<Choice>) -> Self {
        self.selection = Some(choices);
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Build from an `ir.model.fields` record. Selection choices are attached
    /// separately by the schema loader.
    pub fn from_record(record: &Map<String, JsonValue>) -> Result<Self, String> {
        let id = record
            .get("id")
            .and_then(JsonValue::as_i64)
            .ok_or("field record has no id")?;
        let name = opt_string(record, "name").ok_or("field record has no name")?;
        let column_type = opt_string(record, "ttype")
            .ok_or_else(|| format!("field '{}' has no type", name))?;

        Ok(Self {
            id,
            name,
            column_type,
            required: flag(record, "required"),
            read_only: flag(record, "readonly"),
            display_name: opt_string(record, "field_description"),
            size: record.get("size").and_then(JsonValue::as_i64),
            selection: None,
            target_model: opt_string(record, "relation"),
            target_field: opt_string(record, "relation_field"),
        })
    }

    pub fn is_association(&self) -> bool {
        self.is_single_association() || self.is_multiple_association()
    }

    pub fn is_single_association(&self) -> bool {
        SINGLE_ASSOCIATION_TYPES.contains(&self.column_type.as_str())
    }

    pub fn is_multiple_association(&self) -> bool {
        MULTIPLE_ASSOCIATION_TYPES.contains(&self.column_type.as_str())
    }

    /// Label of a selection value, if the field has one.
    pub fn choice_label(&self, value: &str) -> Option<&str> {
        self.selection
            .as_ref()?
            .iter()
            .find(|choice| choice.value == value)
            .map(|choice| choice.label.as_str())
    }
}

/// Description of a remote model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub id: i64,
    /// Technical name, e.g. `res.partner`
    pub name: String,
    pub display_name: String,
    pub transient: bool,
    pub fields: IndexMap<String, FieldMetadata>,
}

impl ModelMetadata {
    pub fn new(id: i64, name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            display_name: display_name.into(),
            transient: false,
            fields: IndexMap::new(),
        }
    }

    pub fn with_field(mut self, field: FieldMetadata) -> Self {
        self.fields.insert(field.name.clone(), field);
        self
    }

    /// Build from an `ir.model` record, without fields.
    pub fn from_record(record: &Map<String, JsonValue>) -> Result<Self, String> {
        let id = record
            .get("id")
            .and_then(JsonValue::as_i64)
            .ok_or("model record has no id")?;
        let name = opt_string(record, "model").ok_or("model record has no technical name")?;
        let display_name = opt_string(record, "name").unwrap_or_else(|| name.clone());
        Ok(Self {
            id,
            name,
            display_name,
            transient: flag(record, "transient"),
            fields: IndexMap::new(),
        })
    }

    pub fn field(&self, name: &str) -> Option<&FieldMetadata> {
        self.fields.get(name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }
}

/// String value of `key`; the server sends `false` for unset values.
fn opt_string(record: &Map<String, JsonValue>, key: &str) -> Option<String> {
    record
        .get(key)
        .and_then(JsonValue::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn flag(record: &Map<String, JsonValue>, key: &str) -> bool {
    record.get(key).and_then(JsonValue::as_bool).unwrap_or(false)
}
