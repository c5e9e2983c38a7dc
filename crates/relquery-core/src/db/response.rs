use thiserror::Error as ThisError;

///
/// ResponseError
/// Errors related to interpreting a materialized result.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ResponseError {
    #[error("expected at most one row, found {count} (entity {entity})")]
    AmbiguousResult { entity: &'static str, count: usize },
}

/// Require at most one row.
pub(crate) fn at_most_one<E>(
    entity: &'static str,
    rows: Vec<E>,
) -> Result<Option<E>, ResponseError> {
    let count = rows.len();

    match count {
        0 | 1 => Ok(rows.into_iter().next()),
        _ => Err(ResponseError::AmbiguousResult { entity, count }),
    }
}
