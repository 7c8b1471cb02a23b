//! Query building and execution.
//!
//! A [`QueryBuilder`] collects what to do (select, search, insert, update,
//! delete) and on what; the [`QueryFactory`] compiles it against the model
//! metadata into a [`Query`] that carries the remote method, positional
//! parameters and options.
//!
//! # Examples
//!
//! ```no_run
//! use odoo_dbal::domain::eq;
//! use odoo_dbal::{DbalError, RecordManager};
//!
//! # fn example(manager: &RecordManager) -> Result<(), DbalError> {
//! let builder = manager
//!     .create_query_builder("res.partner")?
//!     .select(["name"])?
//!     .where_(eq("active", true))?
//!     .set_max_results(Some(1))?;
//!
//! let partner = manager.create_query(&builder)?.get_one_or_null_result()?;
//! # Ok(())
//! # }
//! ```

mod builder;
mod execution;
mod factory;
mod method;

pub use crate::normalizer::OrderDirection;
pub use builder::QueryBuilder;
pub use execution::Query;
pub use factory::QueryFactory;
pub use method::{BuilderMethod, QueryMethod};
