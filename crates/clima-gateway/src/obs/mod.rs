//! Lightweight in-process metrics.
//!
//! Metrics are stored as atomics behind `DashMap` label sets and rendered by
//! the `/metrics` handler in Prometheus text format. Components never touch
//! the registry directly: they receive an `Arc<dyn MetricsRecorder>`.

pub mod metrics;
pub mod recorder;

pub use metrics::ClimaMetrics;
pub use recorder::{MetricsRecorder, NoopRecorder};
