use super::Domain;
use serde_json::Value as JsonValue;
use std::fmt;
use std::str::FromStr;

/// Logical operator of a composite domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOperator {
    And,
    Or,
    Not,
}

impl LogicalOperator {
    /// Prefix token in the wire encoding
    pub fn token(self) -> &'static str {
        match self {
            LogicalOperator::And => "&",
            LogicalOperator::Or => "|",
            LogicalOperator::Not => "!",
        }
    }

    /// Number of operands the prefix token consumes
    pub fn arity(self) -> usize {
        match self {
            LogicalOperator::And | LogicalOperator::Or => 2,
            LogicalOperator::Not => 1,
        }
    }
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogicalOperator::And => "AND",
            LogicalOperator::Or => "OR",
            LogicalOperator::Not => "NOT",
        })
    }
}

impl FromStr for LogicalOperator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "&" | "AND" => Ok(LogicalOperator::And),
            "|" | "OR" => Ok(LogicalOperator::Or),
            "!" | "NOT" => Ok(LogicalOperator::Not),
            _ => Err(format!("Unknown logical operator '{}'", s)),
        }
    }
}

/// A logical operator applied to an ordered list of child domains
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeDomain {
    operator: LogicalOperator,
    children: Vec<Domain>,
}

impl CompositeDomain {
    pub fn new(operator: LogicalOperator, children: Vec<Domain>) -> Self {
        Self { operator, children }
    }

    pub fn operator(&self) -> LogicalOperator {
        self.operator
    }

    pub fn children(&self) -> &[Domain] {
        &self.children
    }

    pub fn add(&mut self, child: impl Into<Domain>) -> &mut Self {
        self.children.push(child.into());
        self
    }

    pub fn into_children(self) -> Vec<Domain> {
        self.children
    }

    /// True when no comparison is reachable from this node.
    pub fn is_empty(&self) -> bool {
        self.children.iter().all(Domain::is_empty)
    }

    /// Prefix-notation tokens: each n-ary AND/OR contributes `n - 1` operator
    /// tokens ahead of its operands, NOT contributes one. Empty children are
    /// dropped.
    pub(crate) fn tokens(&self) -> Vec<JsonValue> {
        let operands: Vec<Vec<JsonValue>> = self
            .children
            .iter()
            .filter(|child| !child.is_empty())
            .map(Domain::tokens)
            .collect();
        if operands.is_empty() {
            return Vec::new();
        }

        let (prefix, operator) = match self.operator {
            LogicalOperator::Not => (vec![LogicalOperator::Not], LogicalOperator::And),
            op => (Vec::new(), op),
        };
        let mut tokens: Vec<JsonValue> = prefix
            .into_iter()
            .map(|op| JsonValue::from(op.token()))
            .collect();
        for _ in 1..operands.len() {
            tokens.push(JsonValue::from(operator.token()));
        }
        tokens.extend(operands.into_iter().flatten());
        tokens
    }

    pub fn to_array(&self) -> JsonValue {
        JsonValue::Array(self.tokens())
    }
}

impl fmt::Display for CompositeDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.operator == LogicalOperator::Not {
            f.write_str("NOT ")?;
        }
        let glue = match self.operator {
            LogicalOperator::Or => " OR ",
            _ => " AND ",
        };
        f.write_str("(")?;
        for (i, child) in self.children.iter().enumerate() {
            if i > 0 {
                f.write_str(glue)?;
            }
            write!(f, "{}", child)?;
        }
        f.write_str(")")
    }
}
