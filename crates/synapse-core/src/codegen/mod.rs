//! Registry generation from whitelists and OpenAPI specs
//!
//! Unmatched whitelist entries are skipped with a warning; only unreadable
//! inputs abort a generation run.

mod platform;
mod unified;

pub use platform::{build_platform_registry, generate_platform_tools_file};
pub use unified::{build_unified_registry, generate_unified_tools_file};

use std::path::PathBuf;

use crate::platform::RegistrySource;

/// A whitelist entry that did not become a tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    pub key: String,
    pub reason: String,
}

impl SkippedEntry {
    fn new(key: &str, reason: impl Into<String>) -> Self {
        Self {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

/// Outcome of writing one registry artifact
#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub source: RegistrySource,
    pub output: PathBuf,
    pub emitted: usize,
    pub skipped: Vec<SkippedEntry>,
}

/// Pick the first non-empty description
fn first_description<'a>(candidates: impl IntoIterator<Item = Option<&'a str>>) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|d| !d.is_empty())
        .map(str::to_string)
}
