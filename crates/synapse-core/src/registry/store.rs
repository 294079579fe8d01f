//! Generated registry artifacts: one JSON file per source

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::types::ToolHandler;
use crate::error::{CoreError, Result};
use crate::platform::RegistrySource;

/// One tool's view across the three registry mappings
#[derive(Debug, Clone, Copy)]
pub struct ToolEntry<'a> {
    pub name: &'a str,
    pub handler: &'a ToolHandler,
    pub schema: &'a Value,
    pub description: &'a str,
}

/// Three parallel name-keyed mappings with identical key sets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolRegistry {
    pub source: RegistrySource,
    pub generated_at: DateTime<Utc>,
    #[serde(rename = "TOOL_HANDLERS")]
    handlers: BTreeMap<String, ToolHandler>,
    #[serde(rename = "TOOL_SCHEMAS")]
    schemas: BTreeMap<String, Value>,
    #[serde(rename = "TOOL_DESCRIPTIONS")]
    descriptions: BTreeMap<String, String>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new(source: RegistrySource) -> Self {
        Self {
            source,
            generated_at: Utc::now(),
            handlers: BTreeMap::new(),
            schemas: BTreeMap::new(),
            descriptions: BTreeMap::new(),
        }
    }

    /// Add a tool to all three mappings. A name that is already present is
    /// rejected and the registry is left unchanged.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        handler: ToolHandler,
        schema: Value,
        description: impl Into<String>,
    ) -> Result<()> {
        let name = name.into();
        if self.handlers.contains_key(&name) {
            return Err(CoreError::DuplicateTool {
                name,
                first: self.source,
                second: self.source,
            });
        }

        self.handlers.insert(name.clone(), handler);
        self.schemas.insert(name.clone(), schema);
        self.descriptions.insert(name, description.into());
        Ok(())
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

    pub fn get(&self, name: &str) -> Option<ToolEntry<'_>> {
        let (name, handler) = self.handlers.get_key_value(name)?;
        Some(ToolEntry {
            name,
            handler,
            schema: self.schemas.get(name)?,
            description: self.descriptions.get(name)?,
        })
    }

    /// All tools, sorted by name
    pub fn entries(&self) -> impl Iterator<Item = ToolEntry<'_>> {
        self.names().filter_map(|name| self.get(name))
    }

    pub fn handlers(&self) -> &BTreeMap<String, ToolHandler> {
        &self.handlers
    }

    pub fn schemas(&self) -> &BTreeMap<String, Value> {
        &self.schemas
    }

    pub fn descriptions(&self) -> &BTreeMap<String, String> {
        &self.descriptions
    }

    /// Path of this registry's artifact inside `dir`
    pub fn path_in(&self, dir: &Path) -> PathBuf {
        dir.join(self.source.file_name())
    }

    /// Write the artifact into `dir`, replacing any previous one atomically
    pub fn save(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = self.path_in(dir);
        let contents = serde_json::to_string_pretty(self)?;

        let temp_path = path.with_extension("json.tmp");
        std::fs::write(&temp_path, contents)?;
        std::fs::rename(&temp_path, &path)?;

        debug!("Saved {} tools to {:?}", self.len(), path);
        Ok(path)
    }

    /// Read an artifact and check that its three mappings agree
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let registry: ToolRegistry = serde_json::from_str(&contents)?;
        registry.validate(path)?;
        Ok(registry)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        let handler_keys: Vec<&String> = self.handlers.keys().collect();
        let schema_keys: Vec<&String> = self.schemas.keys().collect();
        let description_keys: Vec<&String> = self.descriptions.keys().collect();

        if handler_keys != schema_keys || handler_keys != description_keys {
            return Err(CoreError::InconsistentRegistry {
                path: path.to_path_buf(),
                reason: format!(
                    "{} handlers, {} schemas, {} descriptions with differing names",
                    handler_keys.len(),
                    schema_keys.len(),
                    description_keys.len()
                ),
            });
        }
        Ok(())
    }
}

/// Load every generated registry from `dir`.
///
/// The xsiam and xsoar artifacts are required; the unified one is optional.
pub fn load_generated(dir: &Path) -> Result<Vec<ToolRegistry>> {
    let mut registries = Vec::new();

    for source in RegistrySource::ALL {
        let path = dir.join(source.file_name());
        if !path.exists() {
            if source.is_required() {
                return Err(CoreError::MissingRegistry(path));
            }
            debug!("Optional registry {:?} not present", path);
            continue;
        }

        let registry = ToolRegistry::load(&path)?;
        if registry.source != source {
            return Err(CoreError::InconsistentRegistry {
                path,
                reason: format!("declares source {} but is named for {}", registry.source, source),
            });
        }

        info!("Loaded {} {} tools", registry.len(), source);
        registries.push(registry);
    }

    Ok(registries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Platform;
    use crate::registry::HttpBinding;
    use crate::schema::common_input_schema;
    use openapi_parser::HttpMethod;
    use tempfile::TempDir;

    fn handler(route: &str) -> ToolHandler {
        ToolHandler::Platform {
            platform: Platform::Xsiam,
            binding: HttpBinding::bare(route, HttpMethod::Get),
        }
    }

    fn registry(source: RegistrySource, names: &[&str]) -> ToolRegistry {
        let mut registry = ToolRegistry::new(source);
        for name in names {
            registry
                .insert(*name, handler("/items"), common_input_schema(), format!("{name} tool"))
                .unwrap();
        }
        registry
    }

    #[test]
    fn test_insert_rejects_duplicates() {
        let mut registry = registry(RegistrySource::Xsiam, &["xsiam_list_items"]);

        let err = registry
            .insert("xsiam_list_items", handler("/other"), Value::Null, "dup")
            .unwrap_err();
        assert!(matches!(err, CoreError::DuplicateTool { .. }));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("xsiam_list_items").unwrap().description, "xsiam_list_items tool");
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let registry = registry(RegistrySource::Xsiam, &["xsiam_b", "xsiam_a"]);

        let path = registry.save(temp_dir.path()).unwrap();
        assert!(path.ends_with("generated_xsiam_tools.json"));

        let loaded = ToolRegistry::load(&path).unwrap();
        assert_eq!(loaded, registry);
        assert_eq!(loaded.names().collect::<Vec<_>>(), vec!["xsiam_a", "xsiam_b"]);

        let raw: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(raw["TOOL_HANDLERS"]["xsiam_a"].is_object());
        assert!(raw["TOOL_SCHEMAS"]["xsiam_a"].is_object());
        assert_eq!(raw["TOOL_DESCRIPTIONS"]["xsiam_a"], "xsiam_a tool");
    }

    #[test]
    fn test_load_rejects_mismatched_keys() {
        let temp_dir = TempDir::new().unwrap();
        let path = registry(RegistrySource::Xsoar, &["xsoar_a"]).save(temp_dir.path()).unwrap();

        let mut raw: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        raw["TOOL_DESCRIPTIONS"]["xsoar_extra"] = Value::String("orphan".into());
        std::fs::write(&path, raw.to_string()).unwrap();

        let err = ToolRegistry::load(&path).unwrap_err();
        assert!(matches!(err, CoreError::InconsistentRegistry { .. }));
    }

    #[test]
    fn test_load_generated_requires_platform_registries() {
        let temp_dir = TempDir::new().unwrap();
        registry(RegistrySource::Xsiam, &["xsiam_a"]).save(temp_dir.path()).unwrap();

        let err = load_generated(temp_dir.path()).unwrap_err();
        assert!(matches!(err, CoreError::MissingRegistry(p) if p.ends_with("generated_xsoar_tools.json")));

        registry(RegistrySource::Xsoar, &["xsoar_a"]).save(temp_dir.path()).unwrap();
        let loaded = load_generated(temp_dir.path()).unwrap();
        assert_eq!(loaded.len(), 2, "unified registry is optional");
    }
}
