//! Tracing/logging setup shared by every entry point.

/// Tracing configuration (filters, layers).
pub mod tracing;

pub use self::tracing::{DEFAULT_FILTER, init, init_with_default_filter};
