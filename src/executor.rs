//! `RpcExecutor` Module
//!
//! Provides the `RpcExecutor` trait that abstracts the remote `execute_kw` call.
//!
//! The data-access layer never talks to the network itself: schema bootstrap and
//! query execution both go through this trait, so any transport (XML-RPC, JSON-RPC,
//! an in-process fake) can be plugged in.

use crate::error::DbalError;
#[cfg(feature = "tracing")]
use crate::tracing_helpers;
use serde_json::{Map, Value as JsonValue};
use std::fmt;

/// `RpcExecutor` error type
#[derive(Debug, Clone, PartialEq)]
pub enum RpcError {
    /// The call never reached the server (connection refused, timeout, ...)
    Transport(String),
    /// The server answered with a fault
    Remote { code: i64, message: String },
    /// The server answered with a payload that could not be interpreted
    InvalidResponse(String),
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RpcError::Transport(s) => {
                write!(f, "Transport error: {s}")
            }
            RpcError::Remote { code, message } => {
                write!(f, "Remote fault {code}: {message}")
            }
            RpcError::InvalidResponse(s) => {
                write!(f, "Invalid response: {s}")
            }
        }
    }
}

impl std::error::Error for RpcError {}

/// Trait for executing remote model methods
///
/// This trait abstracts the `execute_kw` entry point of the remote API, allowing
/// different implementations (HTTP client, pooled client, mock) to be used
/// interchangeably by the schema and the query layer.
///
/// # Examples
///
/// ```no_run
/// use odoo_dbal::executor::{RpcError, RpcExecutor};
/// use serde_json::{json, Map, Value};
///
/// # fn example(executor: &dyn RpcExecutor) -> Result<(), RpcError> {
/// let mut options = Map::new();
/// options.insert("fields".into(), json!(["name"]));
/// let rows = executor.execute_kw(
///     "res.partner",
///     "search_read",
///     &[json!([["active", "=", true]])],
///     &options,
/// )?;
/// # Ok(())
/// # }
/// ```
pub trait RpcExecutor: Send + Sync {
    /// Execute `method` on `model` with positional `params` and keyword `options`
    ///
    /// `method` is always one of the wire tokens
    /// `create`, `write`, `read`, `search`, `search_read`, `search_count`, `unlink`.
    ///
    /// # Errors
    ///
    /// Returns `RpcError` if the call fails or the server reports a fault.
    fn execute_kw(
        &self,
        model: &str,
        method: &str,
        params: &[JsonValue],
        options: &Map<String, JsonValue>,
    ) -> Result<JsonValue, RpcError>;
}

impl<T: RpcExecutor + ?Sized> RpcExecutor for std::sync::Arc<T> {
    fn execute_kw(
        &self,
        model: &str,
        method: &str,
        params: &[JsonValue],
        options: &Map<String, JsonValue>,
    ) -> Result<JsonValue, RpcError> {
        (**self).execute_kw(model, method, params, options)
    }
}

/// Dispatch one call through `executor`, with logging and an optional span.
pub(crate) fn dispatch(
    executor: &dyn RpcExecutor,
    model: &str,
    method: &str,
    params: &[JsonValue],
    options: &Map<String, JsonValue>,
) -> Result<JsonValue, DbalError> {
    #[cfg(feature = "tracing")]
    let _span = tracing_helpers::execute_kw_span(model, method).entered();

    log::debug!("execute_kw {}.{} ({} params, {} options)", model, method, params.len(), options.len());
    executor.execute_kw(model, method, params, options).map_err(|e| {
        log::debug!("execute_kw {}.{} failed: {}", model, method, e);
        DbalError::from(e)
    })
}
