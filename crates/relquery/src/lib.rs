//! ## Crate layout
//! - `core`: values, the entity model catalog, constraint compilation, the
//!   session-bound query builder, the executor seam, and observability.
//!
//! The `prelude` module carries the vocabulary needed to declare entities
//! and build queries; executors, errors, and sinks stay one module down.

pub use relquery_core as core;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use crate::core::{Error, config, db, error, model, obs, traits, value};

///
/// Prelude
///

pub mod prelude {
    pub use crate::core::{
        db::{
            DbSession,
            query::{CompareOp, Constraint, Pattern},
        },
        model::{EntityModel, FieldKind, FieldModel},
        traits::{EntityKind, Row},
        value::Value,
    };
}
