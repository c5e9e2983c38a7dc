use serde::Serialize;
use std::{cell::RefCell, collections::BTreeMap};

///
/// MetricsReport
/// Ephemeral, in-memory counters for query operations.
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct MetricsReport {
    pub ops: QueryOps,
    pub entities: BTreeMap<String, EntityCounters>,
}

///
/// QueryOps
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct QueryOps {
    // Statements
    pub statements_compiled: u64,
    pub select_calls: u64,
    pub count_calls: u64,
    pub delete_calls: u64,
    pub failed_calls: u64,

    // Rows
    pub rows_delivered: u64,
    pub rows_skipped: u64,
    pub rows_deleted: u64,
}

///
/// EntityCounters
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct EntityCounters {
    pub select_calls: u64,
    pub count_calls: u64,
    pub delete_calls: u64,
    pub failed_calls: u64,
    pub rows_delivered: u64,
    pub rows_deleted: u64,
}

thread_local! {
    static STATE: RefCell<MetricsReport> = RefCell::new(MetricsReport::default());
}

pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut MetricsReport) -> R) -> R {
    STATE.with(|state| f(&mut state.borrow_mut()))
}

pub(crate) fn report() -> MetricsReport {
    STATE.with(|state| state.borrow().clone())
}

pub(crate) fn reset_all() {
    STATE.with(|state| *state.borrow_mut() = MetricsReport::default());
}
