use crate::error::DbalError;
use crate::schema::{ModelMetadata, SchemaError};
use indexmap::IndexMap;
use std::fmt;
use std::str::FromStr;

/// Sort direction of an order clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

impl OrderDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderDirection::Asc => "asc",
            OrderDirection::Desc => "desc",
        }
    }
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderDirection {
    type Err = DbalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(OrderDirection::Asc),
            "desc" => Ok(OrderDirection::Desc),
            other => Err(DbalError::Argument(format!("Invalid order direction '{}'", other))),
        }
    }
}

/// Renders order clauses as the `order` option
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderNormalizer;

impl OrderNormalizer {
    /// `"name asc, id desc"`, or `None` when there is nothing to order by.
    ///
    /// Only the first segment of a dotted name is checked against `model`.
    pub fn normalize(
        &self,
        model: &ModelMetadata,
        orders: &IndexMap<String, OrderDirection>,
    ) -> Result<Option<String>, DbalError> {
        if orders.is_empty() {
            return Ok(None);
        }
        let mut clauses = Vec::with_capacity(orders.len());
        for (name, direction) in orders {
            let root = name.split('.').next().unwrap_or_default();
            if !model.has_field(root) {
                return Err(SchemaError::FieldNotFound {
                    model: model.name.clone(),
                    path: name.clone(),
                }
                .into());
            }
            clauses.push(format!("{} {}", name, direction));
        }
        Ok(Some(clauses.join(", ")))
    }
}
