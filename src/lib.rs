//! # odoo-dbal
//!
//! Data-access layer for Odoo-style external RPC APIs.
//!
//! - [`domain`]: search domain algebra (comparisons and `&`/`|`/`!` composites)
//! - [`query`]: query builder, factory and executable queries
//! - [`schema`]: model/field metadata fetched from the server and cached
//! - [`types`]: per-field-type conversion between native and wire values
//! - [`result`]: result containers, pagination and lazy iteration
//!
//! The network is reached only through the [`RpcExecutor`] trait.
//!
//! ```no_run
//! use odoo_dbal::domain::eq;
//! use odoo_dbal::{DbalError, RecordManager, RpcExecutor};
//! use std::sync::Arc;
//!
//! # fn example(executor: Arc<dyn RpcExecutor>) -> Result<(), DbalError> {
//! let manager = RecordManager::in_memory(executor);
//! let builder = manager
//!     .create_query_builder("res.partner")?
//!     .select(["name"])?
//!     .where_(eq("active", true))?;
//!
//! for row in manager.create_query(&builder)?.iterate(Some(200))? {
//!     println!("{}", row?);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod context;
pub mod domain;
pub mod error;
pub mod executor;
pub mod manager;
pub mod normalizer;
pub mod operation;
pub mod query;
pub mod result;
pub mod schema;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_helpers;
#[cfg(feature = "tracing")]
pub mod tracing_helpers;
pub mod types;
pub mod value;

pub use config::DbalConfig;
pub use context::Context;
pub use domain::{Comparison, CompositeDomain, Domain};
pub use error::{DbalError, QueryError};
pub use executor::{RpcError, RpcExecutor};
pub use manager::RecordManager;
pub use operation::CollectionOperation;
pub use query::{BuilderMethod, OrderDirection, Query, QueryBuilder, QueryFactory, QueryMethod};
pub use result::{ArrayResult, LazyResult, Paginator, RowResult, ScalarResult};
pub use schema::{FieldMetadata, ModelMetadata, Schema, SchemaError};
pub use types::{ConversionError, TypeConverter, TypeRegistry};
pub use value::{Row, Scalar, Value};
