//! Observability: lowering/binding telemetry (metrics) and sink abstractions.
//!
//! Diagnostic text logging goes through `tracing`; counters go through
//! `MetricsEvent` and `MetricsSink`.

pub(crate) mod metrics;
pub(crate) mod sink;

// re-exports
pub use metrics::{EventOps, EventReport};
pub use sink::{MetricsEvent, MetricsSink, metrics_report, metrics_reset_all, with_metrics_sink};
