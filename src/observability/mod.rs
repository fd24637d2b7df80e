//! Observability subsystem
//!
//! Structured logging goes through `tracing`; this module holds the engine's
//! counters.
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No side effects on query results
//! 3. No background threads

mod metrics;

pub use metrics::{EngineMetrics, MetricsSnapshot};
