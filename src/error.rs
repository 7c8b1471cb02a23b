//! Error types for the data-access layer.
//!
//! Each subsystem owns its error enum (`SchemaError`, `ConversionError`,
//! `ResultError`, `RpcError`); they all convert into [`DbalError`], which is what
//! public operations return.

use crate::executor::RpcError;
use crate::result::ResultError;
use crate::schema::SchemaError;
use crate::types::ConversionError;
use std::fmt;

/// Query-state errors: a builder or query method incompatible with the operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// A builder setter/getter was called while the builder is in the wrong method
    InvalidBuilderMethod {
        operation: &'static str,
        method: String,
        allowed: Vec<String>,
    },
    /// A query accessor was called on a query with the wrong wire method
    InvalidQueryMethod {
        operation: &'static str,
        method: String,
        allowed: Vec<String>,
    },
    /// Update and delete queries need at least one target id
    MissingIds { method: String },
    /// Insert and update queries need at least one value
    EmptyValues { method: String },
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::InvalidBuilderMethod {
                operation,
                method,
                allowed,
            } => write!(
                f,
                "Cannot call {} on a query builder in {} mode (allowed: {})",
                operation,
                method,
                allowed.join(", ")
            ),
            QueryError::InvalidQueryMethod {
                operation,
                method,
                allowed,
            } => write!(
                f,
                "Cannot call {} on a query using method '{}' (allowed: {})",
                operation,
                method,
                allowed.join(", ")
            ),
            QueryError::MissingIds { method } => {
                write!(f, "A {} query requires at least one record id", method)
            }
            QueryError::EmptyValues { method } => {
                write!(f, "A {} query requires at least one value", method)
            }
        }
    }
}

impl std::error::Error for QueryError {}

/// Umbrella error returned by every public operation
#[derive(Debug, Clone, PartialEq)]
pub enum DbalError {
    /// Structurally invalid input (empty name, non-positive id, empty payload)
    Argument(String),
    /// Builder / query method mismatch
    Query(QueryError),
    /// Unknown model or field
    Schema(SchemaError),
    /// Type registry or value conversion failure
    Conversion(ConversionError),
    /// Result container misuse
    Result(ResultError),
    /// A single-result accessor found no row
    NoResult,
    /// A single-result accessor found more than one row
    NonUniqueResult { count: usize },
    /// The remote call failed
    Rpc(RpcError),
    /// A cached entry could not be (de)serialized
    Cache(String),
}

impl fmt::Display for DbalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbalError::Argument(msg) => write!(f, "Invalid argument: {}", msg),
            DbalError::Query(e) => write!(f, "Query error: {}", e),
            DbalError::Schema(e) => write!(f, "Schema error: {}", e),
            DbalError::Conversion(e) => write!(f, "Conversion error: {}", e),
            DbalError::Result(e) => write!(f, "Result error: {}", e),
            DbalError::NoResult => write!(f, "No result was found for query although at least one row was expected"),
            DbalError::NonUniqueResult { count } => {
                write!(f, "Query returned {} rows although at most one was expected", count)
            }
            DbalError::Rpc(e) => write!(f, "RPC error: {}", e),
            DbalError::Cache(msg) => write!(f, "Cache error: {}", msg),
        }
    }
}

impl std::error::Error for DbalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DbalError::Query(e) => Some(e),
            DbalError::Schema(e) => Some(e),
            DbalError::Conversion(e) => Some(e),
            DbalError::Result(e) => Some(e),
            DbalError::Rpc(e) => Some(e),
            _ => None,
        }
    }
}

impl From<QueryError> for DbalError {
    fn from(error: QueryError) -> Self {
        DbalError::Query(error)
    }
}

impl From<SchemaError> for DbalError {
    fn from(error: SchemaError) -> Self {
        DbalError::Schema(error)
    }
}

impl From<ConversionError> for DbalError {
    fn from(error: ConversionError) -> Self {
        DbalError::Conversion(error)
    }
}

impl From<ResultError> for DbalError {
    fn from(error: ResultError) -> Self {
        DbalError::Result(error)
    }
}

impl From<RpcError> for DbalError {
    fn from(error: RpcError) -> Self {
        DbalError::Rpc(error)
    }
}
