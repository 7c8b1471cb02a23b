//! Domain (filter expression) algebra.
//!
//! A [`Domain`] is either a [`Comparison`] leaf or a [`CompositeDomain`] applying
//! AND/OR/NOT to child domains. Domains serialize to the prefix-notation list
//! accepted by the remote `search` family of methods:
//!
//! ```
//! use odoo_dbal::domain::{and_x, eq, or_x, Domain};
//! use serde_json::json;
//!
//! let domain = and_x([Domain::from(eq("active", true)), or_x([eq("a", 1), eq("b", 2)]).into()]);
//! assert_eq!(
//!     domain.to_array(),
//!     json!(["&", ["active", "=", true], "|", ["a", "=", 1], ["b", "=", 2]])
//! );
//! ```
//!
//! Raw domain lists coming from callers can be turned back into the object
//! form with [`Domain::from_raw`].

mod comparison;
mod composite;
mod expr;
mod raw;

pub use comparison::{Comparison, ComparisonOperator};
pub use composite::{CompositeDomain, LogicalOperator};
pub use expr::{
    and_x, eq, gt, gte, in_, like, lt, lte, neq, not_in, not_like, not_x, or_x, ueq,
};

use serde_json::Value as JsonValue;
use std::fmt;

/// A filter expression tree
#[derive(Debug, Clone, PartialEq)]
pub enum Domain {
    Comparison(Comparison),
    Composite(CompositeDomain),
}

impl Domain {
    /// True when the tree holds no comparison at all.
    pub fn is_empty(&self) -> bool {
        match self {
            Domain::Comparison(_) => false,
            Domain::Composite(composite) => composite.is_empty(),
        }
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, Domain::Composite(_))
    }

    /// Wire encoding: a `[field, op, value]` triple for a comparison, the flat
    /// prefix-notation list for a composite.
    pub fn to_array(&self) -> JsonValue {
        match self {
            Domain::Comparison(cmp) => cmp.to_array(),
            Domain::Composite(composite) => composite.to_array(),
        }
    }

    pub(crate) fn tokens(&self) -> Vec<JsonValue> {
        match self {
            Domain::Comparison(cmp) => vec![cmp.to_array()],
            Domain::Composite(composite) => composite.tokens(),
        }
    }

    /// Every comparison leaf, depth first.
    pub fn comparisons(&self) -> Vec<&Comparison> {
        let mut out = Vec::new();
        self.collect_comparisons(&mut out);
        out
    }

    fn collect_comparisons<'a>(&'a self, out: &mut Vec<&'a Comparison>) {
        match self {
            Domain::Comparison(cmp) => out.push(cmp),
            Domain::Composite(composite) => {
                for child in composite.children() {
                    child.collect_comparisons(out);
                }
            }
        }
    }

    /// Rebuild the tree, replacing every comparison through `f`.
    pub fn try_map<E, F>(&self, f: &mut F) -> Result<Domain, E>
    where
        F: FnMut(&Comparison) -> Result<Comparison, E>,
    {
        match self {
            Domain::Comparison(cmp) => Ok(Domain::Comparison(f(cmp)?)),
            Domain::Composite(composite) => {
                let children = composite
                    .children()
                    .iter()
                    .map(|child| child.try_map(f))
                    .collect::<Result<Vec<_>, E>>()?;
                Ok(Domain::Composite(CompositeDomain::new(composite.operator(), children)))
            }
        }
    }
}

impl From<Comparison> for Domain {
    fn from(cmp: Comparison) -> Self {
        Domain::Comparison(cmp)
    }
}

impl From<CompositeDomain> for Domain {
    fn from(composite: CompositeDomain) -> Self {
        Domain::Composite(composite)
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Domain::Comparison(cmp) => write!(f, "{}", cmp),
            Domain::Composite(composite) => write!(f, "{}", composite),
        }
    }
}
