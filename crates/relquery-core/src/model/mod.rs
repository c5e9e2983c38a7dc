//! Runtime schema catalog.
//!
//! Types in `model` describe *what exists*: entities, their tables, their
//! fields and the relations between them. Query compilation asks the
//! catalog two questions only:
//! - which joins lead to the property a dotted path names
//! - how a caller-supplied value converts into its database form
pub mod entity;
pub mod field;


pub use entity::{EntityModel, JoinHop, ResolvedPath};
pub use field::{ConstraintValueError, ConvertFn, FieldKind, FieldModel};

use thiserror::Error as ThisError;

///
/// CompileError
///
/// A field path that cannot be resolved against the catalog.
/// Raised the first time the path is compiled; never retried.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum CompileError {
    #[error("empty field path on entity '{entity}'")]
    EmptyPath { entity: &'static str },

    #[error("field '{segment}' in path '{path}' is not a relation of entity '{entity}'")]
    NotARelation {
        entity: &'static str,
        path: String,
        segment: String,
    },

    #[error("unknown field '{segment}' in path '{path}' on entity '{entity}'")]
    UnknownField {
        entity: &'static str,
        path: String,
        segment: String,
    },
}
