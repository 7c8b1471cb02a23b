use crate::value::Value;
use serde_json::{json, Value as JsonValue};
use std::fmt;
use std::str::FromStr;

/// Comparison operator of a domain leaf
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOperator {
    Equal,
    NotEqual,
    /// `=?`: true when the value is unset, equality otherwise
    UnsetOrEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Like,
    ILike,
    EqualLike,
    EqualILike,
    NotLike,
    NotILike,
    In,
    NotIn,
}

impl ComparisonOperator {
    pub const ALL: [ComparisonOperator; 15] = [
        ComparisonOperator::Equal,
        ComparisonOperator::NotEqual,
        ComparisonOperator::UnsetOrEqual,
        ComparisonOperator::LessThan,
        ComparisonOperator::LessThanOrEqual,
        ComparisonOperator::GreaterThan,
        ComparisonOperator::GreaterThanOrEqual,
        ComparisonOperator::Like,
        ComparisonOperator::ILike,
        ComparisonOperator::EqualLike,
        ComparisonOperator::EqualILike,
        ComparisonOperator::NotLike,
        ComparisonOperator::NotILike,
        ComparisonOperator::In,
        ComparisonOperator::NotIn,
    ];

    /// Wire token
    pub fn as_str(self) -> &'static str {
        match self {
            ComparisonOperator::Equal => "=",
            ComparisonOperator::NotEqual => "!=",
            ComparisonOperator::UnsetOrEqual => "=?",
            ComparisonOperator::LessThan => "<",
            ComparisonOperator::LessThanOrEqual => "<=",
            ComparisonOperator::GreaterThan => ">",
            ComparisonOperator::GreaterThanOrEqual => ">=",
            ComparisonOperator::Like => "like",
            ComparisonOperator::ILike => "ilike",
            ComparisonOperator::EqualLike => "=like",
            ComparisonOperator::EqualILike => "=ilike",
            ComparisonOperator::NotLike => "not like",
            ComparisonOperator::NotILike => "not ilike",
            ComparisonOperator::In => "in",
            ComparisonOperator::NotIn => "not in",
        }
    }

    /// `in` and `not in` always carry a list value
    pub fn takes_list(self) -> bool {
        matches!(self, ComparisonOperator::In | ComparisonOperator::NotIn)
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComparisonOperator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == token)
            .ok_or_else(|| format!("Unknown comparison operator '{}'", s))
    }
}

/// A `[field, operator, value]` domain leaf
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    field: String,
    operator: ComparisonOperator,
    value: Value,
}

impl Comparison {
    /// Build a comparison. Scalars given to `in`/`not in` are wrapped into a
    /// one-element list.
    pub fn new(field: impl Into<String>, operator: ComparisonOperator, value: impl Into<Value>) -> Self {
        let value = value.into();
        let value = match value {
            Value::List(_) => value,
            other if operator.takes_list() => Value::List(vec![other]),
            other => other,
        };
        Self {
            field: field.into(),
            operator,
            value,
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn operator(&self) -> ComparisonOperator {
        self.operator
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Same field and operator, different value.
    pub fn with_value(&self, value: impl Into<Value>) -> Self {
        Self::new(self.field.clone(), self.operator, value)
    }

    pub fn to_array(&self) -> JsonValue {
        json!([self.field, self.operator.as_str(), self.value.to_wire()])
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.operator, self.value.to_wire())
    }
}
