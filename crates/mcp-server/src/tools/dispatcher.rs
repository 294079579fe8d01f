//! Name-based dispatch over the merged registry

use serde_json::Value;
use synapse_core::MergedRegistry;
use tracing::{debug, error, warn};

use super::executor::ToolExecutor;
use crate::protocol::{McpTool, ToolCallResult};

/// Read-only after startup; shared between transports behind an `Arc`.
pub struct ToolDispatcher {
    registry: MergedRegistry,
    executor: ToolExecutor,
}

impl ToolDispatcher {
    pub fn new(registry: MergedRegistry, executor: ToolExecutor) -> Self {
        Self { registry, executor }
    }

    pub fn registry(&self) -> &MergedRegistry {
        &self.registry
    }

    /// Every tool, sorted by name
    pub fn list_tools(&self) -> Vec<McpTool> {
        self.registry
            .names()
            .map(|name| McpTool {
                name: name.to_string(),
                description: self.registry.description(name).map(str::to_string),
                input_schema: self
                    .registry
                    .schema(name)
                    .cloned()
                    .unwrap_or_else(|| serde_json::json!({"type": "object"})),
            })
            .collect()
    }

    /// Call a tool. Never fails at the protocol level: unknown names and
    /// invocation errors come back as error-flagged results.
    pub async fn call(&self, name: &str, arguments: Option<Value>) -> ToolCallResult {
        let Some(handler) = self.registry.handler(name) else {
            warn!("Unknown tool requested: {}", name);
            return ToolCallResult::error(format!("Unknown tool: {}", name));
        };

        debug!("Calling tool: {}", name);
        match self.executor.execute(name, handler, arguments).await {
            Ok(text) => ToolCallResult::text(text),
            Err(e) => {
                error!("Tool {} failed: {}", name, e);
                ToolCallResult::error(format!("ERROR: {}", e))
            }
        }
    }
}
