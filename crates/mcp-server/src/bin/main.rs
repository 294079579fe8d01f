//! CortexSynapse MCP server
//!
//! Loads the generated tool registries and serves them over stdio (default)
//! or HTTP. Diagnostic logs go to stderr and only when
//! `CORTEXSYNAPSE_ENABLE_LOGGING` is set.

use anyhow::Context;
use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use tracing::info;

use mcp_server::{McpServer, ServerMode};
use synapse_core::{logging, Settings};

/// CortexSynapse - Cortex XSIAM and XSOAR APIs as MCP tools
#[derive(Parser, Debug)]
#[command(name = "cortexsynapse-server")]
#[command(version)]
#[command(about = "Serve generated Cortex XSIAM/XSOAR tools over MCP")]
struct Args {
    /// Run in stdio mode (for MCP clients that spawn the server)
    #[arg(long)]
    stdio: bool,

    /// Run in HTTP mode
    #[arg(long, conflicts_with = "stdio")]
    http: bool,

    /// Address for the HTTP server
    #[arg(long, default_value = "127.0.0.1")]
    host: IpAddr,

    /// Port for the HTTP server
    #[arg(long, default_value = "3000")]
    port: u16,

    /// Settings JSON file
    #[arg(long, env = "CORTEXSYNAPSE_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding generated_*_tools.json (overrides settings)
    #[arg(long, env = "CORTEXSYNAPSE_GENERATED_DIR")]
    generated_dir: Option<PathBuf>,

    /// Directory of generated markdown docs (overrides settings)
    #[arg(long, env = "CORTEXSYNAPSE_DOCS_DIR")]
    docs_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if logging::logging_enabled() {
        logging::init(tracing::Level::INFO);
    }

    let mut settings = Settings::load(args.config.as_deref()).context("Failed to load settings")?;
    settings.apply_env();
    if let Some(dir) = args.generated_dir {
        settings.generated_dir = dir;
    }
    if let Some(dir) = args.docs_dir {
        settings.docs_dir = dir;
    }
    settings.validate()?;

    // stdio unless HTTP was asked for explicitly
    let mode = match (args.stdio, args.http) {
        (false, true) => ServerMode::Http {
            addr: SocketAddr::new(args.host, args.port),
        },
        _ => ServerMode::Stdio,
    };

    let mut server = McpServer::new(settings).with_mode(mode);
    server
        .initialize()
        .context("Failed to load generated tool registries")?;

    info!("Server ready in {:?} mode", mode);
    server.run().await?;

    Ok(())
}
