//! Utility modules for common functionality.
//!
//! - http: retrying HTTP client construction
//! - logging: tracing subscriber setup
//! - metrics: Prometheus metrics and the metrics server
//! - parsing: hex and address parsing helpers
//! - tests: builders used by unit and integration tests

pub mod http;
pub mod logging;
pub mod metrics;
pub mod parsing;
