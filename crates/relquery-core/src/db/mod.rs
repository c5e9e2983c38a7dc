pub mod executor;
pub mod params;
pub mod query;
pub mod response;

mod session;

pub use executor::{ExecutionError, ExecutorFailure, RowHandler, SqlExecutor, Statement};
pub use params::{Binding, ParamScope, Params};
pub use response::ResponseError;
pub use session::DbSession;
