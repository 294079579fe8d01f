//! Union of all generated registries, built once at server start

use serde_json::Value;
use std::collections::BTreeMap;

use super::store::{ToolEntry, ToolRegistry};
use super::types::ToolHandler;
use crate::error::{CoreError, Result};
use crate::platform::RegistrySource;

/// All tools from every source, keyed by unique name
#[derive(Debug, Clone, Default)]
pub struct MergedRegistry {
    handlers: BTreeMap<String, ToolHandler>,
    schemas: BTreeMap<String, Value>,
    descriptions: BTreeMap<String, String>,
    origins: BTreeMap<String, RegistrySource>,
}

impl MergedRegistry {
    /// Merge registries in order. A name defined by two sources is an error;
    /// later sources never shadow earlier ones.
    pub fn merge(registries: impl IntoIterator<Item = ToolRegistry>) -> Result<Self> {
        let mut merged = Self::default();

        for registry in registries {
            for entry in registry.entries() {
                if let Some(first) = merged.origins.get(entry.name) {
                    return Err(CoreError::DuplicateTool {
                        name: entry.name.to_string(),
                        first: *first,
                        second: registry.source,
                    });
                }
                merged.add(registry.source, entry);
            }
        }

        Ok(merged)
    }

    fn add(&mut self, source: RegistrySource, entry: ToolEntry<'_>) {
        let name = entry.name.to_string();
        self.handlers.insert(name.clone(), entry.handler.clone());
        self.schemas.insert(name.clone(), entry.schema.clone());
        self.descriptions.insert(name.clone(), entry.description.to_string());
        self.origins.insert(name, source);
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Tool names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    pub fn handler(&self, name: &str) -> Option<&ToolHandler> {
        self.handlers.get(name)
    }

    pub fn schema(&self, name: &str) -> Option<&Value> {
        self.schemas.get(name)
    }

    pub fn description(&self, name: &str) -> Option<&str> {
        self.descriptions.get(name).map(String::as_str)
    }

    /// Which artifact defined `name`
    pub fn source(&self, name: &str) -> Option<RegistrySource> {
        self.origins.get(name).copied()
    }

    /// Number of tools contributed by `source`
    pub fn count_from(&self, source: RegistrySource) -> usize {
        self.origins.values().filter(|s| **s == source).count()
    }
}
