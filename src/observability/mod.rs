//! Observability for the students API
//!
//! Structured logs via `tracing`. HTTP request spans come from
//! `tower_http::trace::TraceLayer` in the server module.

mod logger;

pub use logger::{init, subscriber, LogFormat, DEFAULT_FILTER};
