//! Result containers and paged iteration.
//!
//! - [`ArrayResult`]: cursor-based, offset-addressable container
//! - [`RowResult`] / [`ScalarResult`]: records and scalar values
//! - [`ResultFactory`]: wraps raw responses
//! - [`Paginator`] / [`LazyResult`]: page-by-page re-execution of a search query

mod array;
mod error;
mod factory;
mod paginator;
mod row;
mod scalar;

pub use array::{ArrayResult, Offset};
pub use error::ResultError;
pub use factory::ResultFactory;
pub use paginator::{LazyResult, Pages, Paginator};
pub use row::RowResult;
pub use scalar::ScalarResult;
