//! Main OpenAPI parser

use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

use crate::error::{ParseError, ParseResult};
use crate::operations::OperationExtractor;
use crate::types::*;

static LARGE_BOUND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^(\s*(?:minimum|maximum|exclusiveMinimum|exclusiveMaximum):\s*)(-?\d{16,})")
        .expect("valid regex")
});

/// OpenAPI 3.x parser
pub struct OpenApiParser;

impl OpenApiParser {
    /// Parse an OpenAPI spec from a string (auto-detects JSON/YAML)
    pub fn parse(content: &str) -> ParseResult<ParsedSpec> {
        if content.trim_start().starts_with('{') {
            Self::parse_json(content)
        } else {
            Self::parse_yaml(content)
        }
    }

    /// Parse an OpenAPI spec from JSON
    pub fn parse_json(content: &str) -> ParseResult<ParsedSpec> {
        let raw_spec: RawOpenApiSpec = serde_json::from_str(content)?;
        Self::convert_spec(raw_spec)
    }

    /// Parse an OpenAPI spec from YAML
    pub fn parse_yaml(content: &str) -> ParseResult<ParsedSpec> {
        let content = Self::sanitize_large_numbers(content);
        let raw_spec: RawOpenApiSpec = serde_yaml::from_str(&content)?;
        Self::convert_spec(raw_spec)
    }

    /// Read and parse a spec file; `.json` files are parsed as JSON, anything
    /// else is sniffed by content
    pub fn from_file(path: &Path) -> ParseResult<ParsedSpec> {
        let content = std::fs::read_to_string(path)?;
        debug!("Parsing OpenAPI spec from {:?}", path);

        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::parse_json(&content),
            _ => Self::parse(&content),
        }
    }

    /// Vendor specs sometimes carry 64-bit min/max bounds that serde_yaml
    /// rejects as out of range; clamp them to i32 bounds.
    fn sanitize_large_numbers(content: &str) -> String {
        LARGE_BOUND
            .replace_all(content, |caps: &regex::Captures| {
                let prefix = &caps[1];
                if caps[2].starts_with('-') {
                    format!("{}-2147483648", prefix)
                } else {
                    format!("{}2147483647", prefix)
                }
            })
            .into_owned()
    }

    fn convert_spec(raw: RawOpenApiSpec) -> ParseResult<ParsedSpec> {
        if let Some(version) = &raw.openapi {
            if !version.starts_with("3.") {
                return Err(ParseError::UnsupportedVersion(version.clone()));
            }
        }

        let operations = OperationExtractor::extract(&raw);
        debug!("Extracted {} operations", operations.len());

        let servers = raw
            .servers
            .iter()
            .map(|s| ServerInfo {
                url: s.url.clone(),
                description: s.description.clone(),
            })
            .collect();

        let (title, version) = raw
            .info
            .map(|info| (info.title, info.version))
            .unwrap_or_default();

        Ok(ParsedSpec {
            title,
            version,
            servers,
            operations,
        })
    }
}
