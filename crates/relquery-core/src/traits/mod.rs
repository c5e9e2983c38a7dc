//! Entity hydration seam.
//!
//! Rows come back from the execution layer as ordered `(column, Value)`
//! pairs; `EntityKind::hydrate` turns one into an entity. Column values are
//! read through `FromValue`, one property at a time.

mod row;


pub use row::{FromValue, HydrateError, Row};

use crate::model::EntityModel;

///
/// EntityKind
///
/// A queryable entity: its static model plus the hook that materializes it
/// from a row. A projection-restricted row carries only the selected
/// columns (and always the primary key).
///

pub trait EntityKind: Sized {
    fn model() -> &'static EntityModel;

    fn hydrate(row: &Row) -> Result<Self, HydrateError>;
}
