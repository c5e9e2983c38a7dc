//! Module: db::executor
//! Responsibility: the boundary to the pooled SQL execution layer.
//! Does not own: connection pooling, statement preparation, or dialects.
//! Boundary: every call into the layer goes through `run`, which attaches
//! the rendered statement to any failure.

use crate::{db::params::Params, traits::Row};
use std::{error::Error as StdError, fmt, ops::ControlFlow};
use thiserror::Error as ThisError;

/// Failure reported by the execution layer.
pub type ExecutorFailure = Box<dyn StdError + Send + Sync>;

/// Row callback driven by `SqlExecutor::perform`.
pub type RowHandler<'h> = dyn FnMut(Row) -> ControlFlow<()> + 'h;

///
/// Statement
/// Rendered SQL text plus the bindings its placeholders name.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Params,
}

impl Statement {
    #[must_use]
    pub const fn new(sql: String, params: Params) -> Self {
        Self { sql, params }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.params.is_empty() {
            f.write_str(&self.sql)
        } else {
            write!(f, "{} {}", self.sql, self.params)
        }
    }
}

///
/// SqlExecutor
///
/// Blocking execution layer. Implementations acquire a connection per call
/// and must release it (and any prepared statement) on every exit path,
/// which in practice means holding both in guards that release on drop.
///

pub trait SqlExecutor {
    /// Run a query and return its first row, if any.
    fn query_first(&self, statement: &Statement) -> Result<Option<Row>, ExecutorFailure>;

    /// Run a mutating statement and return the affected row count.
    fn execute_update(&self, statement: &Statement) -> Result<u64, ExecutorFailure>;

    /// Stream rows into `handler` until it breaks or the rows run out.
    /// `max_rows` is an upper bound on rows fetched, not an offset.
    fn perform(
        &self,
        statement: &Statement,
        max_rows: Option<u64>,
        handler: &mut RowHandler<'_>,
    ) -> Result<(), ExecutorFailure>;
}

impl<X: SqlExecutor + ?Sized> SqlExecutor for &X {
    fn query_first(&self, statement: &Statement) -> Result<Option<Row>, ExecutorFailure> {
        (**self).query_first(statement)
    }

    fn execute_update(&self, statement: &Statement) -> Result<u64, ExecutorFailure> {
        (**self).execute_update(statement)
    }

    fn perform(
        &self,
        statement: &Statement,
        max_rows: Option<u64>,
        handler: &mut RowHandler<'_>,
    ) -> Result<(), ExecutorFailure> {
        (**self).perform(statement, max_rows, handler)
    }
}

///
/// ExecutionError
///
/// The execution layer failed. Carries the statement exactly as it was
/// sent so the failure can be reproduced without re-running the query.
///

#[derive(Debug, ThisError)]
#[error("statement failed: {source} [sql: {sql}] [params: {params}]")]
pub struct ExecutionError {
    pub sql: String,
    pub params: Params,
    pub source: ExecutorFailure,
}

/// Call into the execution layer; failures are logged with the statement
/// and returned as `ExecutionError`.
pub(crate) fn run<T>(
    statement: &Statement,
    call: impl FnOnce(&Statement) -> Result<T, ExecutorFailure>,
) -> Result<T, ExecutionError> {
    call(statement).map_err(|source| {
        tracing::error!(
            target: "relquery::sql",
            sql = %statement.sql,
            params = %statement.params,
            error = %source,
            "statement execution failed"
        );

        ExecutionError {
            sql: statement.sql.clone(),
            params: statement.params.clone(),
            source,
        }
    })
}
