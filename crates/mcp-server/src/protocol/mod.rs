//! MCP protocol types and handling

mod capabilities;
pub(crate) mod handler;
mod types;

pub use capabilities::{ResourcesCapability, ServerCapabilities, ToolsCapability};
pub use handler::RequestHandler;
pub use types::*;
