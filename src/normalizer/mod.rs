//! Normalizers between caller-facing values and wire parameters.
//!
//! - [`ValueNormalizer`]: write payloads, per field type
//! - [`CriteriaNormalizer`]: search domains
//! - [`OrderNormalizer`]: order clauses
//! - [`ResultNormalizer`]: fetched records back to native values

mod domain;
mod order;
mod result;
mod value;

pub use domain::CriteriaNormalizer;
pub use order::{OrderDirection, OrderNormalizer};
pub use result::ResultNormalizer;
pub use value::ValueNormalizer;
