use crate::{model::EntityModel, value::Value};
use std::fmt;
use thiserror::Error as ThisError;

/// Per-property override of the kind-based value conversion.
/// Returns the database form of the value or a rejection reason.
pub type ConvertFn = fn(&Value) -> Result<Value, String>;

///
/// FieldModel
/// Runtime field metadata used by path resolution and value binding.
///

#[derive(Debug)]
pub struct FieldModel {
    /// Field name as used in field paths.
    pub name: &'static str,
    /// Column on the owning entity's table.
    pub column: &'static str,
    pub kind: FieldKind,
    /// Conversion hook; `None` falls back to the kind-based default.
    pub convert: Option<ConvertFn>,
}

impl FieldModel {
    /// Scalar field whose column shares the field name.
    #[must_use]
    pub const fn scalar(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            column: name,
            kind,
            convert: None,
        }
    }

    /// Relation field stored as a foreign-key column.
    #[must_use]
    pub const fn relation(
        name: &'static str,
        column: &'static str,
        target: &'static EntityModel,
    ) -> Self {
        Self {
            name,
            column,
            kind: FieldKind::Relation(target),
            convert: None,
        }
    }

    #[must_use]
    pub const fn with_column(mut self, column: &'static str) -> Self {
        self.column = column;
        self
    }

    #[must_use]
    pub const fn with_convert(mut self, convert: ConvertFn) -> Self {
        self.convert = Some(convert);
        self
    }

    #[must_use]
    pub const fn relation_target(&self) -> Option<&'static EntityModel> {
        match self.kind {
            FieldKind::Relation(target) => Some(target),
            _ => None,
        }
    }

    /// Convert a caller-supplied value into the form bound to the statement.
    pub fn convert_to_db(&self, value: Value) -> Result<Value, ConstraintValueError> {
        if let Some(convert) = self.convert {
            return convert(&value).map_err(|reason| self.reject(value, reason));
        }

        if value.is_null() {
            return Ok(Value::Null);
        }

        if let FieldKind::Relation(target) = self.kind {
            return target
                .primary_key_field()
                .convert_to_db(value)
                .map_err(|err| ConstraintValueError {
                    field: self.name,
                    ..err
                });
        }

        self.kind.coerce(value).map_err(|value| {
            let reason = format!("expected {}, found {}", self.kind, value.kind_label());
            self.reject(value, reason)
        })
    }

    fn reject(&self, value: Value, reason: String) -> ConstraintValueError {
        ConstraintValueError {
            field: self.name,
            value,
            reason,
        }
    }
}

///
/// FieldKind
///
/// Storage shape of a field. Relations point at the entity they join to.
///

#[derive(Clone, Copy)]
pub enum FieldKind {
    Blob,
    Bool,
    Float,
    Int,
    Relation(&'static EntityModel),
    Text,
    Timestamp,
    Uint,
}

impl FieldKind {
    // Lossless scalar coercion; hands the value back on rejection.
    #[expect(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    fn coerce(self, value: Value) -> Result<Value, Value> {
        match (self, value) {
            (Self::Blob, v @ Value::Blob(_))
            | (Self::Bool, v @ Value::Bool(_))
            | (Self::Float, v @ Value::Float(_))
            | (Self::Int, v @ Value::Int(_))
            | (Self::Text, v @ Value::Text(_))
            | (Self::Timestamp, v @ Value::Timestamp(_))
            | (Self::Uint, v @ Value::Uint(_)) => Ok(v),

            (Self::Int, Value::Uint(n)) => i64::try_from(n)
                .map(Value::Int)
                .map_err(|_| Value::Uint(n)),
            (Self::Uint | Self::Timestamp, Value::Int(n)) => match u64::try_from(n) {
                Ok(n) if matches!(self, Self::Timestamp) => Ok(Value::Timestamp(n)),
                Ok(n) => Ok(Value::Uint(n)),
                Err(_) => Err(Value::Int(n)),
            },
            (Self::Timestamp, Value::Uint(n)) => Ok(Value::Timestamp(n)),
            // integers past 2^53 only survive when the float holds them exactly
            (Self::Float, Value::Int(n)) if (n as f64) as i128 == i128::from(n) => {
                Ok(Value::Float(n as f64))
            }
            (Self::Float, Value::Uint(n)) if (n as f64) as i128 == i128::from(n) => {
                Ok(Value::Float(n as f64))
            }

            (_, v) => Err(v),
        }
    }
}

impl fmt::Debug for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // relations may be cyclic; print the target by name only
            Self::Relation(target) => write!(f, "Relation({})", target.path),
            other => write!(f, "{other}"),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Blob => "blob",
            Self::Bool => "bool",
            Self::Float => "float",
            Self::Int => "int",
            Self::Relation(_) => "relation",
            Self::Text => "text",
            Self::Timestamp => "timestamp",
            Self::Uint => "uint",
        };
        write!(f, "{label}")
    }
}

///
/// ConstraintValueError
///
/// A property's conversion hook rejected a bound value.
///

#[derive(Clone, Debug, PartialEq, ThisError)]
#[error("value {value} rejected for field '{field}': {reason}")]
pub struct ConstraintValueError {
    pub field: &'static str,
    pub value: Value,
    pub reason: String,
}
