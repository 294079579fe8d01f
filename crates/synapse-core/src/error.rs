//! Error types for synapse-core

use std::path::PathBuf;
use thiserror::Error;

use crate::platform::RegistrySource;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error types
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Unknown platform: {0}")]
    UnknownPlatform(String),

    #[error("Invalid whitelist {path:?}: {source}")]
    InvalidWhitelist {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid OpenAPI spec {path:?}: {source}")]
    InvalidSpec {
        path: PathBuf,
        source: openapi_parser::ParseError,
    },

    #[error("Tool '{name}' is defined by both the {first} and {second} registries")]
    DuplicateTool {
        name: String,
        first: RegistrySource,
        second: RegistrySource,
    },

    #[error("Registry {path:?} is inconsistent: {reason}")]
    InconsistentRegistry { path: PathBuf, reason: String },

    #[error("Required registry not found: {0:?}")]
    MissingRegistry(PathBuf),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
