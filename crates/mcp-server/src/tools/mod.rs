//! Tool dispatch and execution

mod dispatcher;
mod executor;
mod request;

pub use dispatcher::ToolDispatcher;
pub use executor::{HttpUpstream, ToolExecutor, Upstream, AUTHORIZATION_HEADER, AUTH_ID_HEADER};
pub use request::RequestPlan;
