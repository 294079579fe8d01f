//! Main MCP server orchestration

use std::net::SocketAddr;
use std::sync::Arc;
use synapse_core::{load_generated, MergedRegistry, RegistrySource, Settings};
use tracing::info;

use crate::error::{Result, ServerError};
use crate::protocol::RequestHandler;
use crate::resources::DocResources;
use crate::tools::{HttpUpstream, ToolDispatcher, ToolExecutor, Upstream};
use crate::transport::{HttpTransport, StdioTransport};

/// Server mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServerMode {
    /// stdio transport (for MCP clients that spawn the server)
    #[default]
    Stdio,
    /// HTTP transport
    Http { addr: SocketAddr },
}

/// Startup progress. Only `Serving` accepts requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Uninitialized,
    MergingRegistries,
    Serving,
}

/// MCP server
pub struct McpServer {
    settings: Settings,
    mode: ServerMode,
    state: ServerState,
    handler: Option<Arc<RequestHandler>>,
}

impl McpServer {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            mode: ServerMode::default(),
            state: ServerState::Uninitialized,
            handler: None,
        }
    }

    pub fn with_mode(mut self, mode: ServerMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn state(&self) -> ServerState {
        self.state
    }

    /// Load and merge the generated registries, scan the docs directory and
    /// build the request handler with the reqwest-backed upstream
    pub fn initialize(&mut self) -> Result<()> {
        let upstream = Arc::new(HttpUpstream::new()?);
        self.initialize_with(upstream)
    }

    /// Same as [`initialize`](Self::initialize) with a caller-supplied upstream.
    /// Any failure leaves the server `Uninitialized`.
    pub fn initialize_with(&mut self, upstream: Arc<dyn Upstream>) -> Result<()> {
        self.state = ServerState::MergingRegistries;

        match self.build_handler(upstream) {
            Ok(handler) => {
                self.handler = Some(Arc::new(handler));
                self.state = ServerState::Serving;
                Ok(())
            }
            Err(e) => {
                self.handler = None;
                self.state = ServerState::Uninitialized;
                Err(e)
            }
        }
    }

    fn build_handler(&self, upstream: Arc<dyn Upstream>) -> Result<RequestHandler> {
        let registries = load_generated(&self.settings.generated_dir)?;
        let registry = MergedRegistry::merge(registries)?;

        info!(
            "Merged {} tools ({} xsiam, {} xsoar, {} unified)",
            registry.len(),
            registry.count_from(RegistrySource::Xsiam),
            registry.count_from(RegistrySource::Xsoar),
            registry.count_from(RegistrySource::Unified)
        );

        let resources = DocResources::scan(&self.settings.docs_dir)?;
        let executor = ToolExecutor::new(upstream).with_settings(&self.settings);
        let dispatcher = ToolDispatcher::new(registry, executor);

        Ok(RequestHandler::new(Arc::new(dispatcher), Arc::new(resources)))
    }

    /// Shared request handler, once serving
    pub fn handler(&self) -> Option<Arc<RequestHandler>> {
        self.handler.clone()
    }

    /// Run the configured transport until it finishes
    pub async fn run(&self) -> Result<()> {
        let handler = match (self.state, &self.handler) {
            (ServerState::Serving, Some(handler)) => handler.clone(),
            _ => return Err(ServerError::NotReady),
        };

        match self.mode {
            ServerMode::Stdio => {
                info!("Starting MCP server in stdio mode");
                StdioTransport::new(handler).run().await
            }
            ServerMode::Http { addr } => {
                info!("Starting MCP server in HTTP mode on {}", addr);
                HttpTransport::new(handler, addr).run().await
            }
        }
    }
}
