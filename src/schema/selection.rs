//! Selection choices.
//!
//! Older servers describe selection fields with a Python literal such as
//! `[('draft', 'Draft'), ('done', 'Done')]`. Only simple quoted pairs are
//! understood; escaped quotes inside a key or label are not.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

static PAIR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\(\s*(?:'([^']*)'|"([^"]*)")\s*,\s*(?:'([^']*)'|"([^"]*)")\s*\)"#)
        .expect("failed to compile selection pattern")
});

/// One allowed value of a selection field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub value: String,
    pub label: String,
}

impl Choice {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Parse a Python list-of-pairs literal.
pub fn parse_selection(literal: &str) -> Vec<Choice> {
    PAIR_RE
        .captures_iter(literal)
        .filter_map(|caps| {
            let value = caps.get(1).or_else(|| caps.get(2))?.as_str();
            let label = caps.get(3).or_else(|| caps.get(4))?.as_str();
            Some(Choice::new(value, label))
        })
        .collect()
}

/// Build choices from `ir.model.fields.selection` records (`value`, `name`).
pub fn choices_from_records(records: &[JsonValue]) -> Vec<Choice> {
    records
        .iter()
        .filter_map(|record| {
            let value = record.get("value")?.as_str()?;
            let label = record.get("name").and_then(JsonValue::as_str).unwrap_or(value);
            Some(Choice::new(value, label))
        })
        .collect()
}
