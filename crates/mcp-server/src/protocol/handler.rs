//! MCP request handler

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::capabilities::ServerCapabilities;
use super::types::*;
use crate::resources::DocResources;
use crate::tools::ToolDispatcher;

/// Handler for MCP requests. Holds only read-only state, so one instance
/// serves concurrent requests.
pub struct RequestHandler {
    dispatcher: Arc<ToolDispatcher>,
    resources: Arc<DocResources>,
    server_name: String,
    server_version: String,
    initialized: AtomicBool,
    early_requests: AtomicUsize,
}

fn parse_params<T: DeserializeOwned>(params: Option<Value>) -> Result<T, McpError> {
    params
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| McpError::invalid_params(e.to_string()))?
        .ok_or_else(|| McpError::invalid_params("Missing params"))
}

fn to_result<T: Serialize>(value: T) -> Result<Value, McpError> {
    serde_json::to_value(value).map_err(|e| McpError::internal_error(e.to_string()))
}

impl RequestHandler {
    pub fn new(dispatcher: Arc<ToolDispatcher>, resources: Arc<DocResources>) -> Self {
        Self {
            dispatcher,
            resources,
            server_name: "CortexSynapse".to_string(),
            server_version: env!("CARGO_PKG_VERSION").to_string(),
            initialized: AtomicBool::new(false),
            early_requests: AtomicUsize::new(0),
        }
    }

    /// Whether a client has completed `initialize`
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Requests other than `initialize` and `ping` received before
    /// `initialize`. They are still answered.
    pub fn early_requests(&self) -> usize {
        self.early_requests.load(Ordering::Relaxed)
    }

    /// Handle an incoming message. Requests always get a response;
    /// notifications and stray responses get none.
    pub async fn handle(&self, message: McpMessage) -> Option<McpMessage> {
        let McpMessage {
            id, method, params, ..
        } = message;

        let Some(method) = method else {
            debug!("Received unexpected response");
            return None;
        };

        let Some(id) = id else {
            self.handle_notification(&method);
            return None;
        };

        debug!("Handling request: {}", method);

        if !matches!(method.as_str(), "initialize" | "ping") && !self.is_initialized() {
            self.early_requests.fetch_add(1, Ordering::Relaxed);
            warn!("'{}' received before initialize", method);
        }

        let result = match method.as_str() {
            "initialize" => self.handle_initialize(params),
            "ping" => Ok(serde_json::json!({})),
            "tools/list" => self.handle_tools_list(),
            "tools/call" => self.handle_tools_call(params).await,
            "resources/list" => self.handle_resources_list(),
            "resources/read" => self.handle_resources_read(params).await,
            _ => Err(McpError::method_not_found()),
        };

        Some(match result {
            Ok(result) => McpMessage::response(id, result),
            Err(error) => McpMessage::error_response(Some(id), error),
        })
    }

    fn handle_notification(&self, method: &str) {
        match method {
            "notifications/initialized" | "initialized" => {
                info!("Client initialized");
            }
            "notifications/cancelled" => {
                debug!("Request cancelled");
            }
            _ => {
                debug!("Unknown notification: {}", method);
            }
        }
    }

    fn handle_initialize(&self, params: Option<Value>) -> Result<Value, McpError> {
        let params: InitializeParams = parse_params(params)?;

        info!(
            "Initializing session with client: {} v{} (protocol {})",
            params.client_info.name, params.client_info.version, params.protocol_version
        );

        self.initialized.store(true, Ordering::Release);

        to_result(InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            capabilities: ServerCapabilities::with_tools_and_resources(),
            server_info: Implementation {
                name: self.server_name.clone(),
                version: self.server_version.clone(),
            },
        })
    }

    fn handle_tools_list(&self) -> Result<Value, McpError> {
        to_result(ToolsListResult {
            tools: self.dispatcher.list_tools(),
        })
    }

    async fn handle_tools_call(&self, params: Option<Value>) -> Result<Value, McpError> {
        let params: ToolCallParams = parse_params(params)?;
        let result = self.dispatcher.call(&params.name, params.arguments).await;
        to_result(result)
    }

    fn handle_resources_list(&self) -> Result<Value, McpError> {
        to_result(ResourcesListResult {
            resources: self.resources.list(),
        })
    }

    async fn handle_resources_read(&self, params: Option<Value>) -> Result<Value, McpError> {
        let params: ResourceReadParams = parse_params(params)?;
        let contents = self.resources.read(&params.uri).await?;
        to_result(ResourceReadResult {
            contents: vec![contents],
        })
    }
}
