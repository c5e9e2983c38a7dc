use crate::{
    db::{ExecutionError, ResponseError},
    model::{CompileError, ConstraintValueError},
    traits::HydrateError,
};
use std::fmt;
use thiserror::Error as ThisError;

///
/// Error
///
/// Every failure a query can surface to its caller.
/// Nothing below this boundary retries or swallows an error; each variant
/// is returned as soon as it is observed.
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    ConstraintValue(#[from] ConstraintValueError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error(transparent)]
    Hydrate(#[from] HydrateError),

    #[error(transparent)]
    Response(#[from] ResponseError),
}

impl Error {
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Compile(_) => ErrorClass::Unsupported,
            Self::ConstraintValue(_) => ErrorClass::InvalidValue,
            Self::Execution(_) => ErrorClass::Internal,
            Self::Hydrate(_) => ErrorClass::Corruption,
            Self::Response(_) => ErrorClass::Conflict,
        }
    }

    #[must_use]
    pub const fn origin(&self) -> ErrorOrigin {
        match self {
            Self::Compile(_) | Self::ConstraintValue(_) => ErrorOrigin::Query,
            Self::Execution(_) => ErrorOrigin::Executor,
            Self::Hydrate(_) => ErrorOrigin::Hydrate,
            Self::Response(_) => ErrorOrigin::Response,
        }
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {self}", self.origin(), self.class())
    }

    /// Rendered SQL attached to the failure, when the execution layer was reached.
    #[must_use]
    pub fn sql(&self) -> Option<&str> {
        match self {
            Self::Execution(err) => Some(err.sql.as_str()),
            _ => None,
        }
    }
}

///
/// ErrorClass
/// Error taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    Conflict,
    Corruption,
    Internal,
    InvalidValue,
    Unsupported,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Conflict => "conflict",
            Self::Corruption => "corruption",
            Self::Internal => "internal",
            Self::InvalidValue => "invalid_value",
            Self::Unsupported => "unsupported",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Which layer raised the error.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Executor,
    Hydrate,
    Query,
    Response,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Executor => "executor",
            Self::Hydrate => "hydrate",
            Self::Query => "query",
            Self::Response => "response",
        };
        write!(f, "{label}")
    }
}
