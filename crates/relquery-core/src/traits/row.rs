use crate::value::Value;
use derive_more::Deref;
use thiserror::Error as ThisError;

///
/// Row
/// One result row, columns in statement order.
///

#[derive(Clone, Debug, Default, Deref, PartialEq)]
pub struct Row(Vec<(String, Value)>);

impl Row {
    #[must_use]
    pub const fn new(columns: Vec<(String, Value)>) -> Self {
        Self(columns)
    }

    /// Append a column; handy when building rows by hand.
    #[must_use]
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.push((column.into(), value.into()));
        self
    }

    #[must_use]
    pub fn value(&self, column: &str) -> Option<&Value> {
        self.0
            .iter()
            .find_map(|(name, value)| (name == column).then_some(value))
    }

    /// Read a typed column value.
    pub fn get<T: FromValue>(&self, column: &str) -> Result<T, HydrateError> {
        match self.value(column) {
            Some(value) => T::from_value(value).ok_or_else(|| HydrateError::TypeMismatch {
                column: column.to_string(),
                expected: T::EXPECTED,
                found: value.kind_label(),
            }),
            None => T::missing().ok_or_else(|| HydrateError::MissingColumn {
                column: column.to_string(),
            }),
        }
    }
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

///
/// FromValue
/// Typed extraction of a single column value.
///

pub trait FromValue: Sized {
    const EXPECTED: &'static str;

    fn from_value(value: &Value) -> Option<Self>;

    /// Value to use when the column is absent from a projected row.
    fn missing() -> Option<Self> {
        None
    }
}

impl FromValue for bool {
    const EXPECTED: &'static str = "bool";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(v) => Some(*v),
            Value::Int(v) => Some(*v != 0),
            Value::Uint(v) => Some(*v != 0),
            _ => None,
        }
    }
}

impl FromValue for i64 {
    const EXPECTED: &'static str = "int";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(v) => Some(*v),
            Value::Uint(v) => Self::try_from(*v).ok(),
            _ => None,
        }
    }
}

impl FromValue for u64 {
    const EXPECTED: &'static str = "uint";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Uint(v) | Value::Timestamp(v) => Some(*v),
            Value::Int(v) => Self::try_from(*v).ok(),
            _ => None,
        }
    }
}

impl FromValue for f64 {
    const EXPECTED: &'static str = "float";

    #[expect(clippy::cast_precision_loss)]
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(v) => Some(*v),
            Value::Int(v) => Some(*v as Self),
            Value::Uint(v) => Some(*v as Self),
            _ => None,
        }
    }
}

impl FromValue for String {
    const EXPECTED: &'static str = "text";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_text().map(ToString::to_string)
    }
}

impl FromValue for Vec<u8> {
    const EXPECTED: &'static str = "blob";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Blob(bytes) => Some(bytes.clone()),
            _ => None,
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    const EXPECTED: &'static str = T::EXPECTED;

    fn from_value(value: &Value) -> Option<Self> {
        if value.is_null() {
            Some(None)
        } else {
            T::from_value(value).map(Some)
        }
    }

    fn missing() -> Option<Self> {
        Some(None)
    }
}

///
/// HydrateError
/// A row could not be materialized into an entity.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum HydrateError {
    #[error("column '{column}' missing from row")]
    MissingColumn { column: String },

    #[error("column '{column}' expected {expected}, found {found}")]
    TypeMismatch {
        column: String,
        expected: &'static str,
        found: &'static str,
    },
}
