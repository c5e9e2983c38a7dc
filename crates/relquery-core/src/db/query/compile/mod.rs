//! Module: query::compile
//! Responsibility: mutable per-query state and its rendering into SELECT and
//! COUNT statements.
//! Does not own: execution, hydration, or client-side paging of rows.
//! Boundary: cached fragments are dropped by every mutator that affects them.


use crate::{
    config::QueryConfig,
    db::{
        executor::Statement,
        params::{ParamScope, Params},
        query::{
            constraint::{Constraint, RenderContext},
            path::{BASE_ALIAS, CompilationState},
        },
    },
    error::Error,
    model::EntityModel,
    obs::sink::{MetricsEvent, record},
};
use std::fmt;

///
/// OrderDirection
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

impl OrderDirection {
    #[must_use]
    pub const fn from_ascending(ascending: bool) -> Self {
        if ascending { Self::Asc } else { Self::Desc }
    }

    #[must_use]
    pub const fn sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

///
/// SortKey
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SortKey {
    pub field: String,
    pub direction: OrderDirection,
}

///
/// Page
///
/// Client-side pagination window. `skip` rows are discarded as they stream
/// in; `max` bounds the rows delivered (`None` is unbounded).
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Page {
    pub skip: u64,
    pub max: Option<u64>,
}

impl Page {
    /// Build a window from caller input. Negative values clamp to zero and
    /// a `max` of zero means "no limit".
    #[must_use]
    pub fn new(skip: i64, max: i64) -> Self {
        let max = clamp(max);

        Self {
            skip: clamp(skip),
            max: (max > 0).then_some(max),
        }
    }

    /// Upper bound on rows fetched from the execution layer.
    #[must_use]
    pub const fn fetch_cap(&self) -> Option<u64> {
        match self.max {
            Some(max) => Some(self.skip.saturating_add(max)),
            None => None,
        }
    }
}

fn clamp(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

///
/// QuerySpec
///
/// Everything one query accumulates before it runs: constraints, sort keys,
/// projection, page window, the join state paths compile into, and the
/// WHERE and ORDER BY fragments rendered from them.
///

#[derive(Clone, Debug)]
pub struct QuerySpec {
    model: &'static EntityModel,
    constraints: Vec<Constraint>,
    order: Vec<SortKey>,
    projection: Option<Vec<String>>,
    page: Page,
    state: CompilationState,
    where_cache: Option<(String, Params)>,
    order_cache: Option<String>,
}

impl QuerySpec {
    #[must_use]
    pub fn new(model: &'static EntityModel) -> Self {
        Self {
            model,
            constraints: Vec::new(),
            order: Vec::new(),
            projection: None,
            page: Page::default(),
            state: CompilationState::new(),
            where_cache: None,
            order_cache: None,
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    #[must_use]
    pub const fn model(&self) -> &'static EntityModel {
        self.model
    }

    #[must_use]
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    #[must_use]
    pub fn order(&self) -> &[SortKey] {
        &self.order
    }

    #[must_use]
    pub fn projection(&self) -> Option<&[String]> {
        self.projection.as_deref()
    }

    #[must_use]
    pub const fn page(&self) -> Page {
        self.page
    }

    #[must_use]
    pub const fn state(&self) -> &CompilationState {
        &self.state
    }

    // ------------------------------------------------------------------
    // Mutators
    // ------------------------------------------------------------------

    pub fn filter(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
        self.where_cache = None;
    }

    pub fn order_by(&mut self, field: impl Into<String>, direction: OrderDirection) {
        self.order.push(SortKey {
            field: field.into(),
            direction,
        });
        self.order_cache = None;
    }

    /// Restrict the projection. Repeated calls extend the field list.
    pub fn fields<I, S>(&mut self, fields: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projection
            .get_or_insert_with(Vec::new)
            .extend(fields.into_iter().map(Into::into));
    }

    pub const fn set_page(&mut self, page: Page) {
        self.page = page;
    }

    pub fn set_skip(&mut self, skip: i64) {
        self.page.skip = clamp(skip);
    }

    // ------------------------------------------------------------------
    // Compilation
    // ------------------------------------------------------------------

    /// `SELECT <projection> FROM <table> t<joins> [WHERE ...] [ORDER BY ...]`
    pub fn compile_select(&mut self, config: &QueryConfig) -> Result<Statement, Error> {
        let (where_sql, params) = self.where_clause(config)?;
        let order_sql = self.order_clause()?;
        let projection = self.projection_sql()?;

        let mut sql = format!(
            "SELECT {projection} FROM {} {BASE_ALIAS}{}",
            self.model.table,
            self.state.joins()
        );
        if !where_sql.is_empty() {
            sql.push(' ');
            sql.push_str(&where_sql);
        }
        if !order_sql.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&order_sql);
        }

        Ok(self.finish(Statement::new(sql, params), config))
    }

    /// `SELECT COUNT(*) FROM <table> t<joins> [WHERE ...]`
    pub fn compile_count(&mut self, config: &QueryConfig) -> Result<Statement, Error> {
        let (where_sql, params) = self.where_clause(config)?;

        let mut sql = format!(
            "SELECT COUNT(*) FROM {} {BASE_ALIAS}{}",
            self.model.table,
            self.state.joins()
        );
        if !where_sql.is_empty() {
            sql.push(' ');
            sql.push_str(&where_sql);
        }

        Ok(self.finish(Statement::new(sql, params), config))
    }

    /// WHERE clause and its bindings; empty when no constraint contributes.
    ///
    /// Top-level constraint `i` renders under scope `<prefix><i>` (1-based
    /// list position), whether or not earlier constraints contributed.
    pub fn where_clause(&mut self, config: &QueryConfig) -> Result<(String, Params), Error> {
        if let Some(cached) = &self.where_cache {
            return Ok(cached.clone());
        }

        let mut sql = String::new();
        let mut params = Params::new();
        let mut ctx = RenderContext {
            model: self.model,
            state: &mut self.state,
            params: &mut params,
            config,
        };

        for (index, constraint) in self.constraints.iter().enumerate() {
            if !constraint.contributes() {
                continue;
            }

            let scope = ParamScope::top_level(&config.param_prefix, index + 1);
            let fragment = constraint.render(&mut ctx, &scope)?;

            sql.push_str(if sql.is_empty() { "WHERE " } else { "    AND " });
            sql.push_str(&fragment);
        }

        self.where_cache = Some((sql.clone(), params.clone()));

        Ok((sql, params))
    }

    /// Sort keys in call order, without the `ORDER BY` keyword.
    pub fn order_clause(&mut self) -> Result<String, Error> {
        if let Some(cached) = &self.order_cache {
            return Ok(cached.clone());
        }

        let mut keys = Vec::with_capacity(self.order.len());
        for key in &self.order {
            let column = self.state.compile(self.model, &key.field)?;
            keys.push(format!("{column} {}", key.direction.sql()));
        }

        let sql = keys.join(", ");
        self.order_cache = Some(sql.clone());

        Ok(sql)
    }

    // Primary key first, then the requested fields in order, without repeats.
    fn projection_sql(&mut self) -> Result<String, Error> {
        let Some(fields) = &self.projection else {
            return Ok(format!("{BASE_ALIAS}.*"));
        };

        let pk = self.model.primary_key_field();
        let mut columns = vec![format!("{BASE_ALIAS}.{}", pk.column)];

        for field in fields {
            let column = self.state.compile(self.model, field)?.to_string();
            if !columns.contains(&column) {
                columns.push(column);
            }
        }

        Ok(columns.join(", "))
    }

    fn finish(&self, statement: Statement, config: &QueryConfig) -> Statement {
        announce_compiled(self.model.path, &statement, config);

        statement
    }
}

/// Count a freshly rendered statement and log it when statement logging
/// is on.
pub(crate) fn announce_compiled(
    entity_path: &'static str,
    statement: &Statement,
    config: &QueryConfig,
) {
    record(MetricsEvent::Compiled { entity_path });

    if config.log_statements {
        tracing::debug!(
            target: "relquery::sql",
            entity = entity_path,
            sql = %statement.sql,
            params = %statement.params,
            "compiled statement"
        );
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.direction.sql())
    }
}
