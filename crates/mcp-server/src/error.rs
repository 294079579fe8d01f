//! Error types for the MCP server

use synapse_core::{CoreError, Platform};
use thiserror::Error;

/// Why a single tool call failed. Never ends the session; the dispatcher
/// turns it into an error-flagged text result.
#[derive(Error, Debug)]
pub enum InvocationError {
    #[error("Missing required argument 'platform' (expected 'xsoar' or 'xsiam')")]
    MissingPlatform,

    #[error("Unsupported platform: {0} (expected 'xsoar' or 'xsiam')")]
    UnsupportedPlatform(String),

    #[error("Tool '{tool}' is not available on {platform}")]
    NoBinding { tool: String, platform: Platform },

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Missing path parameter '{0}'")]
    UnresolvedPathParameter(String),

    #[error("No base URL configured for {0}")]
    MissingBaseUrl(Platform),

    #[error("Invalid request URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("HTTP request failed: {0}")]
    Transport(String),

    #[error("HTTP {status} - {body}")]
    UpstreamStatus { status: u16, body: String },
}

/// Startup and transport failures
#[derive(Error, Debug)]
pub enum ServerError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Server is not ready to serve requests")]
    NotReady,

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Docs directory scan failed: {0}")]
    DocsScan(#[from] walkdir::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
