//! Span constructors used when the `tracing` feature is enabled.
//!
//! Callers enter the span for the duration of the instrumented call:
//!
//! ```ignore
//! let _span = tracing_helpers::execute_kw_span("res.partner", "search_read").entered();
//! ```

use tracing::{info_span, Span};

/// Span around one remote `execute_kw` dispatch.
pub fn execute_kw_span(model: &str, method: &str) -> Span {
    info_span!("rpc.execute_kw", model = %model, method = %method)
}

/// Span around the remote bootstrap of one model's metadata.
pub fn fetch_model_span(model: &str) -> Span {
    info_span!("schema.fetch_model", model = %model)
}

/// Span around one paginator page fetch.
pub fn fetch_page_span(model: &str, offset: usize, limit: usize) -> Span {
    info_span!("query.fetch_page", model = %model, offset = offset, limit = limit)
}
