//! # mcp-server
//!
//! MCP (Model Context Protocol) server for CortexSynapse.
//! Serves the generated XSIAM, XSOAR and unified tools plus the generated
//! documentation over stdio or HTTP.

pub mod error;
pub mod protocol;
pub mod resources;
mod server;
pub mod tools;
pub mod transport;

pub use error::{InvocationError, ServerError};
pub use protocol::{McpError, McpMessage, RequestHandler, ServerCapabilities};
pub use resources::DocResources;
pub use server::{McpServer, ServerMode, ServerState};
pub use tools::{HttpUpstream, RequestPlan, ToolDispatcher, ToolExecutor, Upstream};
pub use transport::{HttpTransport, StdioTransport};
