//! Lightweight in-process metrics.
//!
//! Decisions, alias failures, and refresh outcomes are stored as atomics and
//! rendered in Prometheus text format by the `/metrics` handler.

pub mod metrics;

pub use metrics::AuthzMetrics;
