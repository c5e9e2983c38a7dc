//! Core runtime for relquery: the value domain, the entity model catalog,
//! the constraint compiler, and the session-bound query builder that runs
//! compiled statements through a pluggable SQL execution layer.

// public exports are one module level down
pub mod config;
pub mod db;
pub mod error;
pub mod model;
pub mod obs;
pub mod traits;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_support;

pub use error::Error;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, executors, sinks, or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        db::{
            DbSession,
            query::{Constraint, Pattern},
        },
        model::{EntityModel, FieldKind, FieldModel},
        traits::{EntityKind, Row},
        value::Value,
    };
}
