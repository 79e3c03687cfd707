//! Observability for the routing layer
//!
//! Structured logging setup for the binary and process-wide routing metrics.
//! The library itself only emits `tracing` events and bumps counters.

pub mod logging;
pub mod metrics;

// Re-export for convenience
pub use logging::{build_subscriber, init_logging, init_logging_from_env, LogFormat, UnknownLogFormat};
pub use metrics::{metrics, MetricsCollector, MetricsSnapshot};

// Span macros for structured logging
pub use logging::{registry_span, route_span};
