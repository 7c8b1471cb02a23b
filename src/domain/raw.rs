use super::{Comparison, ComparisonOperator, CompositeDomain, Domain, LogicalOperator};
use crate::error::DbalError;
use crate::value::Value;
use serde_json::Value as JsonValue;

impl Domain {
    /// Parse a raw prefix-notation domain list.
    ///
    /// Each logical token (`&`, `|`, `!`, or their `AND`/`OR`/`NOT` spellings)
    /// consumes the next two (AND/OR) or one (NOT) expressions; every other
    /// element must be a `[field, operator, value]` triple. Expressions left
    /// over at the top level are AND-ed, as the server does. A bare triple is
    /// accepted as a single comparison. Empty input yields `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// use odoo_dbal::domain::Domain;
    /// use serde_json::json;
    ///
    /// let raw = json!(["|", ["a", "=", 1], ["b", "=", 2]]);
    /// let domain = Domain::from_raw(&raw).unwrap().unwrap();
    /// assert_eq!(domain.to_array(), raw);
    /// ```
    pub fn from_raw(raw: &JsonValue) -> Result<Option<Domain>, DbalError> {
        let items = match raw {
            JsonValue::Null => return Ok(None),
            JsonValue::Array(items) => items,
            other => return Err(DbalError::Argument(format!("Domain must be a list, got {}", other))),
        };
        if items.is_empty() {
            return Ok(None);
        }
        if is_leaf(raw) {
            return Ok(Some(Domain::Comparison(parse_leaf(items)?)));
        }

        let mut pos = 0;
        let mut expressions = Vec::new();
        while pos < items.len() {
            expressions.push(parse_expression(items, &mut pos)?);
        }
        if expressions.len() == 1 {
            Ok(expressions.pop())
        } else {
            Ok(Some(Domain::Composite(CompositeDomain::new(LogicalOperator::And, expressions))))
        }
    }
}

fn logical_token(item: &JsonValue) -> Option<LogicalOperator> {
    item.as_str().and_then(|s| s.parse().ok())
}

/// A triple whose first element is a field name rather than a logical token.
fn is_leaf(item: &JsonValue) -> bool {
    match item.as_array() {
        Some(parts) if parts.len() == 3 => {
            parts[0].is_string() && logical_token(&parts[0]).is_none() && parts[1].is_string()
        }
        _ => false,
    }
}

fn parse_expression(items: &[JsonValue], pos: &mut usize) -> Result<Domain, DbalError> {
    let item = items
        .get(*pos)
        .ok_or_else(|| DbalError::Argument("Domain ends before all operands were given".to_string()))?;
    *pos += 1;

    if let Some(operator) = logical_token(item) {
        let mut children = Vec::with_capacity(operator.arity());
        for _ in 0..operator.arity() {
            children.push(parse_expression(items, pos)?);
        }
        return Ok(Domain::Composite(CompositeDomain::new(operator, children)));
    }

    match item {
        JsonValue::Array(parts) if is_leaf(item) => Ok(Domain::Comparison(parse_leaf(parts)?)),
        other => Err(DbalError::Argument(format!("Invalid domain element {}", other))),
    }
}

fn parse_leaf(parts: &[JsonValue]) -> Result<Comparison, DbalError> {
    let field = parts[0].as_str().unwrap_or_default();
    let operator: ComparisonOperator = parts[1]
        .as_str()
        .unwrap_or_default()
        .parse()
        .map_err(DbalError::Argument)?;
    Ok(Comparison::new(field, operator, Value::from(&parts[2])))
}
