//! Module: query::constraint
//! Responsibility: boolean constraint tree and its SQL rendering.
//! Does not own: path resolution (delegates to `CompilationState`) or value
//! coercion (delegates to the field's conversion hook).
//! Boundary: a node either contributes SQL or renders nothing at all.

mod pattern;

#[cfg(test)]
mod property;
#[cfg(test)]
mod tests;

pub use pattern::{Pattern, PatternPredicate, normalize_pattern};

use crate::{
    config::QueryConfig,
    db::{
        params::{ParamScope, Params},
        query::path::{ColumnRef, CompilationState},
    },
    error::Error,
    model::{CompileError, EntityModel},
    value::Value,
};
use std::ops::{BitAnd, BitOr};

///
/// CompareOp
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CompareOp {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
    Ne,
}

impl CompareOp {
    #[must_use]
    pub const fn sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Ne => "<>",
        }
    }
}

///
/// TextMode
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum TextMode {
    #[default]
    Cs, // case-sensitive
    Ci, // case-insensitive
}

///
/// Combinator
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Combinator {
    And,
    Or,
}

impl Combinator {
    const fn separator(self) -> &'static str {
        match self {
            Self::And => " AND ",
            Self::Or => " OR ",
        }
    }
}

///
/// ComparePredicate
///

#[derive(Clone, Debug, PartialEq)]
pub struct ComparePredicate {
    pub field: String,
    pub op: CompareOp,
    pub value: Value,
    pub text_mode: TextMode,
    /// Drop the predicate entirely when `value` is null.
    pub ignore_null: bool,
}

///
/// Constraint
///
/// Immutable predicate node. Leaves compare, match patterns or check for
/// null; `Group` combines children with AND or OR.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Constraint {
    Compare(ComparePredicate),
    Group {
        combinator: Combinator,
        children: Vec<Self>,
    },
    NullCheck {
        field: String,
        is_null: bool,
    },
    Pattern(PatternPredicate),
}

impl Constraint {
    // ------------------------------------------------------------------
    // Comparison constraints
    // ------------------------------------------------------------------

    #[must_use]
    pub fn compare(field: impl Into<String>, op: CompareOp, value: impl Into<Value>) -> Self {
        Self::Compare(ComparePredicate {
            field: field.into(),
            op,
            value: value.into(),
            text_mode: TextMode::Cs,
            ignore_null: false,
        })
    }

    /// Equality. A null value still renders `col = NULL`, which matches no
    /// row; use `eq_ignore_null` or `not_filled` for optional filters.
    #[must_use]
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, CompareOp::Eq, value)
    }

    /// Equality that renders nothing when the value is null.
    #[must_use]
    pub fn eq_ignore_null(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::eq(field, value).ignoring_null()
    }

    /// Case-insensitive equality; lower-cases both column and value.
    #[must_use]
    pub fn eq_ignore_case(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::eq(field, value).ignoring_case()
    }

    #[must_use]
    pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, CompareOp::Ne, value)
    }

    #[must_use]
    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, CompareOp::Lt, value)
    }

    #[must_use]
    pub fn lte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, CompareOp::Lte, value)
    }

    #[must_use]
    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, CompareOp::Gt, value)
    }

    #[must_use]
    pub fn gte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, CompareOp::Gte, value)
    }

    /// Mark a comparison as dropped-when-null. Other nodes are unchanged.
    #[must_use]
    pub fn ignoring_null(self) -> Self {
        match self {
            Self::Compare(cmp) => Self::Compare(ComparePredicate {
                ignore_null: true,
                ..cmp
            }),
            other => other,
        }
    }

    /// Switch a comparison or pattern to case-insensitive matching.
    #[must_use]
    pub fn ignoring_case(self) -> Self {
        match self {
            Self::Compare(cmp) => Self::Compare(ComparePredicate {
                text_mode: TextMode::Ci,
                ..cmp
            }),
            Self::Pattern(pattern) => Self::Pattern(PatternPredicate {
                text_mode: TextMode::Ci,
                ..pattern
            }),
            other => other,
        }
    }

    // ------------------------------------------------------------------
    // Structural constraints
    // ------------------------------------------------------------------

    /// Field holds a value (`IS NOT NULL`).
    #[must_use]
    pub fn filled(field: impl Into<String>) -> Self {
        Self::NullCheck {
            field: field.into(),
            is_null: false,
        }
    }

    /// Field is null (`IS NULL`).
    #[must_use]
    pub fn not_filled(field: impl Into<String>) -> Self {
        Self::NullCheck {
            field: field.into(),
            is_null: true,
        }
    }

    #[must_use]
    pub const fn and(children: Vec<Self>) -> Self {
        Self::Group {
            combinator: Combinator::And,
            children,
        }
    }

    #[must_use]
    pub const fn or(children: Vec<Self>) -> Self {
        Self::Group {
            combinator: Combinator::Or,
            children,
        }
    }

    // ------------------------------------------------------------------
    // Evaluation
    // ------------------------------------------------------------------

    /// Whether this node renders any SQL.
    #[must_use]
    pub fn contributes(&self) -> bool {
        match self {
            Self::Compare(cmp) => !(cmp.ignore_null && cmp.value.is_null()),
            Self::Group { children, .. } => children.iter().any(Self::contributes),
            Self::NullCheck { .. } => true,
            Self::Pattern(pattern) => pattern.contributes(),
        }
    }

    /// Render this node; a non-contributing node renders the empty string
    /// and binds nothing.
    pub(crate) fn render(
        &self,
        ctx: &mut RenderContext<'_>,
        scope: &ParamScope,
    ) -> Result<String, Error> {
        if !self.contributes() {
            return Ok(String::new());
        }

        match self {
            Self::Compare(cmp) => {
                let column = ctx.column(&cmp.field)?;
                let value = column.field.convert_to_db(cmp.value.clone())?;

                let (lhs, value) = case_sides(&column, value, cmp.text_mode);
                let placeholder = ctx.bind(scope, value);

                Ok(format!("{lhs} {} {placeholder}", cmp.op.sql()))
            }

            Self::Group {
                combinator,
                children,
            } => {
                let mut parts = Vec::with_capacity(children.len());
                for (index, child) in children.iter().enumerate() {
                    if child.contributes() {
                        parts.push(child.render(ctx, &scope.child(index))?);
                    }
                }

                Ok(format!("({})", parts.join(combinator.separator())))
            }

            Self::NullCheck { field, is_null } => {
                let column = ctx.column(field)?;
                let check = if *is_null { "IS NULL" } else { "IS NOT NULL" };

                Ok(format!("{column} {check}"))
            }

            Self::Pattern(pattern) => {
                let column = ctx.column(&pattern.field)?;
                let value = Value::Text(pattern.normalized());

                let (lhs, value) = case_sides(&column, value, pattern.text_mode);
                let placeholder = ctx.bind(scope, value);

                Ok(format!("{lhs} LIKE {placeholder}"))
            }
        }
    }
}

// Case-insensitive sides lower-case both the column and the bound value.
fn case_sides(column: &ColumnRef, value: Value, mode: TextMode) -> (String, Value) {
    match mode {
        TextMode::Cs => (column.to_string(), value),
        TextMode::Ci => (format!("LOWER({column})"), value.casefold()),
    }
}

impl BitAnd for Constraint {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self::and(vec![self, rhs])
    }
}

impl BitOr for Constraint {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self::or(vec![self, rhs])
    }
}

///
/// RenderContext
///
/// Everything a node needs while rendering: the entity paths resolve
/// against, the query's join state, and the bindings being collected.
///

pub(crate) struct RenderContext<'a> {
    pub model: &'static EntityModel,
    pub state: &'a mut CompilationState,
    pub params: &'a mut Params,
    pub config: &'a QueryConfig,
}

impl RenderContext<'_> {
    fn column(&mut self, path: &str) -> Result<ColumnRef, CompileError> {
        self.state.compile(self.model, path)
    }

    fn bind(&mut self, scope: &ParamScope, value: Value) -> String {
        self.params.bind(scope, value);

        self.config.placeholder(scope.name())
    }
}
