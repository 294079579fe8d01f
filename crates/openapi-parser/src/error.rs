//! Parser errors

use thiserror::Error;

pub type ParseResult<T> = std::result::Result<T, ParseError>;

/// Everything that can go wrong while reading a vendor API description
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Malformed API description: {0}")]
    InvalidFormat(String),

    #[error("Unknown HTTP method '{0}'")]
    InvalidMethod(String),

    #[error("Could not decode YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Could not decode JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Could not read API description: {0}")]
    IoError(#[from] std::io::Error),

    /// Only OpenAPI 3.x documents are accepted
    #[error("Unsupported OpenAPI version: {0}")]
    UnsupportedVersion(String),
}
