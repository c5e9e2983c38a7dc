//! Module: query::select
//! Responsibility: session-bound fluent query, execution routing, and
//! client-side pagination of streamed rows.
//! Does not own: SQL rendering (delegates to `QuerySpec`) or row decoding
//! (delegates to `EntityKind::hydrate`).
//! Boundary: terminal operations consume the query; a query runs once.


use crate::{
    db::{
        DbSession,
        executor::{self, SqlExecutor, Statement},
        params::{ParamScope, Params},
        query::{
            compile::{OrderDirection, Page, QuerySpec, announce_compiled},
            constraint::Constraint,
        },
        response::at_most_one,
    },
    error::Error,
    model::EntityModel,
    obs::sink::{ExecKind, MetricsEvent, record},
    traits::{EntityKind, FromValue, HydrateError, Row},
    value::Value,
};
use std::{marker::PhantomData, ops::ControlFlow};

///
/// SelectQuery
///
/// Session-bound query over one entity type. Mutators return the query;
/// terminal operations consume it.
///

pub struct SelectQuery<'s, E, X> {
    session: &'s DbSession<X>,
    spec: QuerySpec,
    _marker: PhantomData<fn() -> E>,
}

impl<'s, E, X> SelectQuery<'s, E, X>
where
    E: EntityKind,
    X: SqlExecutor,
{
    pub(crate) fn new(session: &'s DbSession<X>) -> Self {
        Self {
            session,
            spec: QuerySpec::new(E::model()),
            _marker: PhantomData,
        }
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    #[must_use]
    pub const fn spec(&self) -> &QuerySpec {
        &self.spec
    }

    /// Render the SELECT statement without running it.
    pub fn compile_select(&mut self) -> Result<Statement, Error> {
        self.spec.compile_select(self.session.config())
    }

    /// Render the COUNT statement without running it.
    pub fn compile_count(&mut self) -> Result<Statement, Error> {
        self.spec.compile_count(self.session.config())
    }

    fn map_spec(mut self, map: impl FnOnce(&mut QuerySpec)) -> Self {
        map(&mut self.spec);
        self
    }

    // ------------------------------------------------------------------
    // Projection and constraints
    // ------------------------------------------------------------------

    /// Restrict the selected columns. The primary key is always selected.
    #[must_use]
    pub fn fields<I, S>(self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.map_spec(|spec| spec.fields(fields))
    }

    #[must_use]
    pub fn filter(self, constraint: Constraint) -> Self {
        self.map_spec(|spec| spec.filter(constraint))
    }

    #[must_use]
    pub fn where_all(self, constraints: impl IntoIterator<Item = Constraint>) -> Self {
        self.map_spec(|spec| {
            for constraint in constraints {
                spec.filter(constraint);
            }
        })
    }

    #[must_use]
    pub fn eq(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(Constraint::eq(field, value))
    }

    #[must_use]
    pub fn eq_ignore_null(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(Constraint::eq_ignore_null(field, value))
    }

    #[must_use]
    pub fn filled(self, field: impl Into<String>) -> Self {
        self.filter(Constraint::filled(field))
    }

    #[must_use]
    pub fn not_filled(self, field: impl Into<String>) -> Self {
        self.filter(Constraint::not_filled(field))
    }

    // ------------------------------------------------------------------
    // Ordering and paging
    // ------------------------------------------------------------------

    #[must_use]
    pub fn order_by(self, field: impl Into<String>, ascending: bool) -> Self {
        self.map_spec(|spec| spec.order_by(field, OrderDirection::from_ascending(ascending)))
    }

    #[must_use]
    pub fn order_by_asc(self, field: impl Into<String>) -> Self {
        self.order_by(field, true)
    }

    #[must_use]
    pub fn order_by_desc(self, field: impl Into<String>) -> Self {
        self.order_by(field, false)
    }

    /// Deliver at most `max` rows from the start; zero means unbounded.
    #[must_use]
    pub fn limit(self, max: i64) -> Self {
        self.limit_range(0, max)
    }

    /// Skip `skip` rows, then deliver at most `max`.
    #[must_use]
    pub fn limit_range(self, skip: i64, max: i64) -> Self {
        self.map_spec(|spec| spec.set_page(Page::new(skip, max)))
    }

    /// Skip `skip` rows, keeping any configured maximum.
    #[must_use]
    pub fn start(self, skip: i64) -> Self {
        self.map_spec(|spec| spec.set_skip(skip))
    }

    // ------------------------------------------------------------------
    // Execution
    // ------------------------------------------------------------------

    /// Stream matching entities into `handler` and return how many were
    /// delivered. The first `skip` rows are discarded before hydration;
    /// the stream ends when the handler breaks or `max` rows were delivered.
    pub fn perform(
        mut self,
        mut handler: impl FnMut(E) -> ControlFlow<()>,
    ) -> Result<u64, Error> {
        let entity = E::model().path;
        let session = self.session;

        session.with_metrics(|| {
            let statement = self.compile_select()?;
            let page = self.spec.page();

            record(MetricsEvent::ExecStart {
                kind: ExecKind::Select,
                entity_path: entity,
            });

            let mut seen = 0u64;
            let mut delivered = 0u64;
            let mut hydrate_failure = None;

            let mut on_row = |row: Row| {
                seen += 1;
                if seen <= page.skip {
                    tracing::trace!(
                        target: "relquery::sql",
                        entity,
                        position = seen - 1,
                        "row skipped"
                    );
                    return ControlFlow::Continue(());
                }

                let item = match E::hydrate(&row) {
                    Ok(item) => item,
                    Err(err) => {
                        hydrate_failure = Some(err);
                        return ControlFlow::Break(());
                    }
                };

                delivered += 1;
                let flow = handler(item);
                if page.max.is_some_and(|max| delivered >= max) {
                    return ControlFlow::Break(());
                }

                flow
            };

            let outcome = executor::run(&statement, |statement| {
                session
                    .executor()
                    .perform(statement, page.fetch_cap(), &mut on_row)
            });

            let result = match (outcome, hydrate_failure) {
                (Err(err), _) => Err(Error::from(err)),
                (Ok(()), Some(err)) => Err(Error::from(err)),
                (Ok(()), None) => Ok(delivered),
            };

            finish(ExecKind::Select, entity, &result, seen.min(page.skip));

            result
        })
    }

    /// Every matching entity, in statement order.
    pub fn list(self) -> Result<Vec<E>, Error> {
        let mut rows = Vec::new();
        self.perform(|entity| {
            rows.push(entity);
            ControlFlow::Continue(())
        })?;

        Ok(rows)
    }

    /// The first matching entity, if any.
    pub fn first(self) -> Result<Option<E>, Error> {
        Ok(self.limit_range(0, 1).list()?.into_iter().next())
    }

    /// The only matching entity; more than one match is an error.
    pub fn one(self) -> Result<Option<E>, Error> {
        let rows = self.limit_range(0, 2).list()?;

        Ok(at_most_one(E::model().path, rows)?)
    }

    /// Number of matching rows; paging does not apply.
    pub fn count(mut self) -> Result<u64, Error> {
        let entity = E::model().path;
        let session = self.session;

        session.with_metrics(|| {
            let statement = self.compile_count()?;

            record(MetricsEvent::ExecStart {
                kind: ExecKind::Count,
                entity_path: entity,
            });

            let result = executor::run(&statement, |statement| {
                session.executor().query_first(statement)
            })
            .map_err(Error::from)
            .and_then(|row| count_from_row(row.as_ref()).map_err(Error::from));

            finish(ExecKind::Count, entity, &result, 0);

            result
        })
    }

    pub fn exists(self) -> Result<bool, Error> {
        Ok(self.count()? > 0)
    }

    /// Delete every matching row (paging applies) and return the number of
    /// rows the execution layer reports as affected.
    ///
    /// Primary keys are collected from the SELECT stream first; each row is
    /// then deleted by key.
    pub fn delete(mut self) -> Result<u64, Error> {
        let model = E::model();
        let session = self.session;

        session.with_metrics(|| {
            let statement = self.compile_select()?;
            let page = self.spec.page();

            record(MetricsEvent::ExecStart {
                kind: ExecKind::Delete,
                entity_path: model.path,
            });

            let mut skipped = 0;
            let result = collect_keys(session.executor(), &statement, page, model)
                .and_then(|(keys, seen_skipped)| {
                    skipped = seen_skipped;
                    delete_by_key(session, model, keys)
                });

            finish(ExecKind::Delete, model.path, &result, skipped);

            result
        })
    }
}

// Issue one keyed DELETE per collected primary key.
fn delete_by_key<X: SqlExecutor>(
    session: &DbSession<X>,
    model: &'static EntityModel,
    keys: Vec<Value>,
) -> Result<u64, Error> {
    let config = session.config();
    let pk_column = model.primary_key_field().column;
    let scope = ParamScope::top_level(&config.param_prefix, 1);
    let sql = format!(
        "DELETE FROM {} WHERE {pk_column} = {}",
        model.table,
        config.placeholder(scope.name())
    );

    let mut affected = 0u64;
    for key in keys {
        let mut params = Params::new();
        params.bind(&scope, key);
        let statement = Statement::new(sql.clone(), params);
        announce_compiled(model.path, &statement, config);

        affected += executor::run(&statement, |statement| {
            session.executor().execute_update(statement)
        })?;
    }

    Ok(affected)
}

// Stream the SELECT and keep the primary key of every row inside the page.
// Also returns how many rows the page skipped.
fn collect_keys<X: SqlExecutor>(
    executor: &X,
    statement: &Statement,
    page: Page,
    model: &'static EntityModel,
) -> Result<(Vec<Value>, u64), Error> {
    let pk_column = model.primary_key_field().column;
    let mut seen = 0u64;
    let mut collected = 0u64;
    let mut keys = Vec::new();
    let mut missing = None;

    let mut on_row = |row: Row| {
        seen += 1;
        if seen <= page.skip {
            tracing::trace!(
                target: "relquery::sql",
                entity = model.path,
                position = seen - 1,
                "row skipped"
            );
            return ControlFlow::Continue(());
        }

        let Some(key) = row.value(pk_column) else {
            missing = Some(HydrateError::MissingColumn {
                column: pk_column.to_string(),
            });
            return ControlFlow::Break(());
        };
        keys.push(key.clone());
        collected += 1;

        if page.max.is_some_and(|max| collected >= max) {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    };

    executor::run(statement, |statement| {
        executor.perform(statement, page.fetch_cap(), &mut on_row)
    })?;

    match missing {
        Some(err) => Err(err.into()),
        None => Ok((keys, seen.min(page.skip))),
    }
}

// COUNT(*) arrives as the first column of the first row.
fn count_from_row(row: Option<&Row>) -> Result<u64, HydrateError> {
    let Some(row) = row else {
        return Ok(0);
    };
    let Some((column, value)) = row.first() else {
        return Err(HydrateError::MissingColumn {
            column: "COUNT(*)".to_string(),
        });
    };

    u64::from_value(value).ok_or_else(|| HydrateError::TypeMismatch {
        column: column.clone(),
        expected: u64::EXPECTED,
        found: value.kind_label(),
    })
}

fn finish(kind: ExecKind, entity_path: &'static str, result: &Result<u64, Error>, skipped: u64) {
    let event = match result {
        Ok(rows) => MetricsEvent::ExecFinish {
            kind,
            entity_path,
            rows_delivered: *rows,
            rows_skipped: skipped,
        },
        Err(_) => MetricsEvent::ExecFailed { kind, entity_path },
    };

    record(event);
}
