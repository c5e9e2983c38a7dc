use crate::{
    config::QueryConfig,
    db::{executor::SqlExecutor, query::SelectQuery},
    obs::sink::{MetricsSink, with_metrics_sink},
    traits::EntityKind,
};
use std::rc::Rc;

///
/// DbSession
///
/// Session-scoped handle: the execution layer queries run against, the
/// statement template they render with, and an optional metrics sink.
///

pub struct DbSession<X> {
    executor: X,
    config: QueryConfig,
    metrics: Option<Rc<dyn MetricsSink>>,
}

impl<X: SqlExecutor> DbSession<X> {
    #[must_use]
    pub fn new(executor: X) -> Self {
        Self {
            executor,
            config: QueryConfig::default(),
            metrics: None,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: QueryConfig) -> Self {
        self.config = config;
        self
    }

    /// Route this session's metrics events to `sink` instead of the
    /// process-local counters.
    #[must_use]
    pub fn metrics_sink(mut self, sink: Rc<dyn MetricsSink>) -> Self {
        self.metrics = Some(sink);
        self
    }

    #[must_use]
    pub const fn config(&self) -> &QueryConfig {
        &self.config
    }

    #[must_use]
    pub const fn executor(&self) -> &X {
        &self.executor
    }

    pub(crate) fn with_metrics<T>(&self, f: impl FnOnce() -> T) -> T {
        if let Some(sink) = &self.metrics {
            with_metrics_sink(Rc::clone(sink), f)
        } else {
            f()
        }
    }

    // ---------------------------------------------------------------------
    // Query entry points
    // ---------------------------------------------------------------------

    /// Start a query over `E`.
    #[must_use]
    pub fn select<E: EntityKind>(&self) -> SelectQuery<'_, E, X> {
        SelectQuery::new(self)
    }
}
