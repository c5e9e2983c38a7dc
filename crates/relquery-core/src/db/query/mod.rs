//! Query construction and compilation: constraint trees, path resolution,
//! per-query compilation state, and the session-bound fluent builder.

pub mod compile;
pub mod constraint;
pub mod path;
pub mod select;

pub use compile::{OrderDirection, Page, QuerySpec, SortKey};
pub use constraint::{
    Combinator, CompareOp, ComparePredicate, Constraint, Pattern, PatternPredicate, TextMode,
};
pub use path::{BASE_ALIAS, ColumnRef, CompilationState};
pub use select::SelectQuery;
