pub(crate) mod executor;
pub(crate) mod fixtures;

pub(crate) use executor::RecordingExecutor;
pub(crate) use fixtures::{COMPANY, DEPARTMENT, TestUser, USER};
