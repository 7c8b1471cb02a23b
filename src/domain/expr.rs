//! Expression constructors.
//!
//! Values are stored as given; wildcard characters for the `like` family are
//! the caller's business.

use super::{Comparison, ComparisonOperator, CompositeDomain, Domain, LogicalOperator};
use crate::value::Value;

fn composite<I>(operator: LogicalOperator, children: I) -> CompositeDomain
where
    I: IntoIterator,
    I::Item: Into<Domain>,
{
    CompositeDomain::new(operator, children.into_iter().map(Into::into).collect())
}

pub fn and_x<I>(children: I) -> CompositeDomain
where
    I: IntoIterator,
    I::Item: Into<Domain>,
{
    composite(LogicalOperator::And, children)
}

pub fn or_x<I>(children: I) -> CompositeDomain
where
    I: IntoIterator,
    I::Item: Into<Domain>,
{
    composite(LogicalOperator::Or, children)
}

/// Negation; several children are AND-ed before being negated.
pub fn not_x<I>(children: I) -> CompositeDomain
where
    I: IntoIterator,
    I::Item: Into<Domain>,
{
    composite(LogicalOperator::Not, children)
}

pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Comparison {
    Comparison::new(field, ComparisonOperator::Equal, value)
}

pub fn neq(field: impl Into<String>, value: impl Into<Value>) -> Comparison {
    Comparison::new(field, ComparisonOperator::NotEqual, value)
}

/// Unset-or-equal (`=?`)
pub fn ueq(field: impl Into<String>, value: impl Into<Value>) -> Comparison {
    Comparison::new(field, ComparisonOperator::UnsetOrEqual, value)
}

pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Comparison {
    Comparison::new(field, ComparisonOperator::LessThan, value)
}

pub fn lte(field: impl Into<String>, value: impl Into<Value>) -> Comparison {
    Comparison::new(field, ComparisonOperator::LessThanOrEqual, value)
}

pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Comparison {
    Comparison::new(field, ComparisonOperator::GreaterThan, value)
}

pub fn gte(field: impl Into<String>, value: impl Into<Value>) -> Comparison {
    Comparison::new(field, ComparisonOperator::GreaterThanOrEqual, value)
}

/// Pattern match.
///
/// | strict | case sensitive | operator |
/// |---|---|---|
/// | yes | yes | `=like` |
/// | yes | no | `=ilike` |
/// | no | yes | `like` |
/// | no | no | `ilike` |
pub fn like(
    field: impl Into<String>,
    value: impl Into<Value>,
    strict: bool,
    case_sensitive: bool,
) -> Comparison {
    let operator = match (strict, case_sensitive) {
        (true, true) => ComparisonOperator::EqualLike,
        (true, false) => ComparisonOperator::EqualILike,
        (false, true) => ComparisonOperator::Like,
        (false, false) => ComparisonOperator::ILike,
    };
    Comparison::new(field, operator, value)
}

pub fn not_like(field: impl Into<String>, value: impl Into<Value>, case_sensitive: bool) -> Comparison {
    let operator = if case_sensitive {
        ComparisonOperator::NotLike
    } else {
        ComparisonOperator::NotILike
    };
    Comparison::new(field, operator, value)
}

/// Membership; a scalar becomes a one-element list, lists are kept as is.
pub fn in_(field: impl Into<String>, values: impl Into<Value>) -> Comparison {
    Comparison::new(field, ComparisonOperator::In, values)
}

pub fn not_in(field: impl Into<String>, values: impl Into<Value>) -> Comparison {
    Comparison::new(field, ComparisonOperator::NotIn, values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_like_matrix() {
        assert_eq!(like("name", "Ac%", true, true).operator().as_str(), "=like");
        assert_eq!(like("name", "Ac%", true, false).operator().as_str(), "=ilike");
        assert_eq!(like("name", "Ac", false, true).operator().as_str(), "like");
        assert_eq!(like("name", "Ac", false, false).operator().as_str(), "ilike");
        assert_eq!(not_like("name", "Ac", true).operator().as_str(), "not like");
        assert_eq!(not_like("name", "Ac", false).operator().as_str(), "not ilike");
    }

    #[test]
    fn test_like_value_is_not_wildcarded() {
        assert_eq!(like("name", "Ac", false, true).value(), &Value::from("Ac"));
    }

    #[test]
    fn test_in_and_not_in() {
        assert_eq!(in_("f", 3).value(), &Value::from(vec![3]));
        assert_eq!(in_("f", vec![3, 4]).value(), &Value::from(vec![3, 4]));
        assert_eq!(not_in("f", "x").to_array(), json!(["f", "not in", ["x"]]));
    }

    #[test]
    fn test_direct_operators() {
        let tokens: Vec<&str> = [
            eq("f", 1),
            neq("f", 1),
            ueq("f", 1),
            lt("f", 1),
            lte("f", 1),
            gt("f", 1),
            gte("f", 1),
        ]
        .iter()
        .map(|c| c.operator().as_str())
        .collect();
        assert_eq!(tokens, vec!["=", "!=", "=?", "<", "<=", ">", ">="]);
    }
}
