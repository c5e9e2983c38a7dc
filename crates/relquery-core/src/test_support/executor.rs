use crate::{
    db::{ExecutorFailure, RowHandler, SqlExecutor, Statement},
    traits::Row,
};
use std::cell::{Cell, RefCell};

///
/// RecordingExecutor
///
/// In-memory execution layer: streams canned rows, answers COUNT with a
/// canned row, and records every statement and fetch cap it receives.
///

pub(crate) struct RecordingExecutor {
    rows: Vec<Row>,
    count_row: Option<Row>,
    affected_per_update: u64,
    failure: Option<String>,
    statements: RefCell<Vec<Statement>>,
    fetch_caps: RefCell<Vec<Option<u64>>>,
    streamed: Cell<usize>,
}

impl RecordingExecutor {
    pub(crate) fn new() -> Self {
        Self {
            rows: Vec::new(),
            count_row: None,
            affected_per_update: 1,
            failure: None,
            statements: RefCell::new(Vec::new()),
            fetch_caps: RefCell::new(Vec::new()),
            streamed: Cell::new(0),
        }
    }

    pub(crate) fn with_rows(mut self, rows: impl IntoIterator<Item = Row>) -> Self {
        self.rows = rows.into_iter().collect();
        self
    }

    pub(crate) fn with_count(mut self, count: u64) -> Self {
        self.count_row = Some(Row::default().with("COUNT(*)", count));
        self
    }

    pub(crate) fn with_count_row(mut self, row: Row) -> Self {
        self.count_row = Some(row);
        self
    }

    pub(crate) const fn with_affected_per_update(mut self, affected: u64) -> Self {
        self.affected_per_update = affected;
        self
    }

    pub(crate) fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    pub(crate) fn statements(&self) -> Vec<Statement> {
        self.statements.borrow().clone()
    }

    pub(crate) fn fetch_caps(&self) -> Vec<Option<u64>> {
        self.fetch_caps.borrow().clone()
    }

    /// Rows handed to a `perform` handler so far.
    pub(crate) fn streamed(&self) -> usize {
        self.streamed.get()
    }

    fn record(&self, statement: &Statement) -> Result<(), ExecutorFailure> {
        self.statements.borrow_mut().push(statement.clone());

        match &self.failure {
            Some(message) => Err(message.clone().into()),
            None => Ok(()),
        }
    }
}

impl SqlExecutor for RecordingExecutor {
    fn query_first(&self, statement: &Statement) -> Result<Option<Row>, ExecutorFailure> {
        self.record(statement)?;

        Ok(self.count_row.clone())
    }

    fn execute_update(&self, statement: &Statement) -> Result<u64, ExecutorFailure> {
        self.record(statement)?;

        Ok(self.affected_per_update)
    }

    fn perform(
        &self,
        statement: &Statement,
        max_rows: Option<u64>,
        handler: &mut RowHandler<'_>,
    ) -> Result<(), ExecutorFailure> {
        self.fetch_caps.borrow_mut().push(max_rows);
        self.record(statement)?;

        let cap = max_rows.map_or(usize::MAX, |max| usize::try_from(max).unwrap_or(usize::MAX));
        for row in self.rows.iter().take(cap) {
            self.streamed.set(self.streamed.get() + 1);
            if handler(row.clone()).is_break() {
                break;
            }
        }

        Ok(())
    }
}
