//! Observability: runtime query telemetry and sink abstractions.
//!
//! Query code never touches the counters directly; it emits `MetricsEvent`s
//! through `sink::record`, and the active sink decides what to keep.

pub(crate) mod metrics;
pub(crate) mod sink;


// re-exports
pub use metrics::{EntityCounters, MetricsReport, QueryOps};
pub use sink::{
    ExecKind, MetricsEvent, MetricsSink, metrics_report, metrics_reset_all, with_metrics_sink,
};
