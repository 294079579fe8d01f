//! Markdown documentation for generated registries
//!
//! Each source gets one page per category under `{docs_dir}/{source}/`, and a
//! `README.md` index links them all. Every run rewrites the whole tree.

mod categories;
mod render;

pub use categories::{category_slug, CategoryPolicy, Predicate};
pub use render::{render_category, render_index, render_tool, CategoryCounts};

use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::Result;
use crate::platform::Platform;
use crate::registry::{ToolEntry, ToolRegistry};

/// The parts of a tool a documentation page shows
#[derive(Debug, Clone)]
pub struct DocTool {
    pub name: String,
    pub description: String,
    pub unified: bool,
    pub schema: Value,
    /// `METHOD route` per platform the tool can reach
    pub endpoints: Vec<(Platform, String)>,
}

impl From<ToolEntry<'_>> for DocTool {
    fn from(entry: ToolEntry<'_>) -> Self {
        Self {
            name: entry.name.to_string(),
            description: entry.description.to_string(),
            unified: entry.handler.is_unified(),
            schema: entry.schema.clone(),
            endpoints: entry
                .handler
                .bindings()
                .into_iter()
                .map(|(platform, binding)| (platform, format!("{} {}", binding.method, binding.route)))
                .collect(),
        }
    }
}

/// What a docs run wrote
#[derive(Debug, Clone, Default)]
pub struct DocsReport {
    pub index: PathBuf,
    pub pages: Vec<PathBuf>,
    pub tools: usize,
}

/// Group a registry's tools by category, in category-name order
fn categorize(registry: &ToolRegistry) -> BTreeMap<&'static str, Vec<DocTool>> {
    let policy = CategoryPolicy::for_source(registry.source);
    let mut grouped: BTreeMap<&'static str, Vec<DocTool>> = BTreeMap::new();

    for entry in registry.entries() {
        let category = policy.categorize(entry.name, entry.description);
        grouped.entry(category).or_default().push(DocTool::from(entry));
    }

    grouped
}

/// Remove category pages left over from an earlier run
fn clear_pages(dir: &Path) -> Result<()> {
    if !dir.is_dir() {
        return Ok(());
    }
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "md") {
            std::fs::remove_file(&path)?;
        }
    }
    Ok(())
}

/// Render every registry into `docs_dir`
pub fn generate_docs(registries: &[ToolRegistry], docs_dir: &Path) -> Result<DocsReport> {
    std::fs::create_dir_all(docs_dir)?;

    let mut report = DocsReport::default();
    let mut counts = CategoryCounts::new();

    for registry in registries {
        let source_dir = docs_dir.join(registry.source.as_str());
        clear_pages(&source_dir)?;
        std::fs::create_dir_all(&source_dir)?;

        let grouped = categorize(registry);
        let source_counts = counts.entry(registry.source).or_default();

        for (category, tools) in &grouped {
            let path = source_dir.join(format!("{}.md", category_slug(category)));
            std::fs::write(&path, render_category(category, tools, registry.source))?;
            debug!("Wrote {} {} tools to {:?}", tools.len(), category, path);

            source_counts.insert(*category, tools.len());
            report.pages.push(path);
        }

        report.tools += registry.len();
        info!(
            "Documented {} {} tools in {} categories",
            registry.len(),
            registry.source,
            grouped.len()
        );
    }

    report.index = docs_dir.join("README.md");
    std::fs::write(&report.index, render_index(&counts))?;
    info!("Wrote documentation index {:?}", report.index);

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::RegistrySource;
    use crate::registry::{HttpBinding, ToolHandler};
    use crate::schema::{common_input_schema, unified_input_schema};
    use openapi_parser::HttpMethod;
    use tempfile::TempDir;

    fn platform_registry(platform: Platform, names: &[&str]) -> ToolRegistry {
        let mut registry = ToolRegistry::new(platform.into());
        for name in names {
            let handler = ToolHandler::Platform {
                platform,
                binding: HttpBinding::bare("/items", HttpMethod::Get),
            };
            registry
                .insert(*name, handler, common_input_schema(), format!("{name} description"))
                .unwrap();
        }
        registry
    }

    fn unified_registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new(RegistrySource::Unified);
        let bindings = BTreeMap::from([
            (Platform::Xsiam, HttpBinding::bare("/public_api/v1/incidents/get_incidents", HttpMethod::Post)),
            (Platform::Xsoar, HttpBinding::bare("/incidents/search", HttpMethod::Post)),
        ]);
        registry
            .insert(
                "get_incidents",
                ToolHandler::Unified { bindings },
                unified_input_schema(),
                "Fetch incidents",
            )
            .unwrap();
        registry
    }

    #[test]
    fn test_generate_docs_writes_pages_and_index() {
        let temp_dir = TempDir::new().unwrap();
        let registries = vec![
            platform_registry(Platform::Xsiam, &["xsiam_get_incidents", "xsiam_get_alerts", "xsiam_get_users"]),
            platform_registry(Platform::Xsoar, &["xsoar_get_playbooks"]),
            unified_registry(),
        ];

        let report = generate_docs(&registries, temp_dir.path()).unwrap();
        assert_eq!(report.tools, 5);
        assert_eq!(report.pages.len(), 5);

        let incidents = std::fs::read_to_string(temp_dir.path().join("xsiam/incidents.md")).unwrap();
        assert!(incidents.contains("### `xsiam_get_incidents`"));
        assert!(incidents.contains("- XSIAM: `GET /items`"));
        assert!(temp_dir.path().join("xsiam/assets-and-identity.md").exists());

        let unified = std::fs::read_to_string(temp_dir.path().join("unified/incidents.md")).unwrap();
        assert!(unified.contains("**Unified Tool**"));
        assert!(unified.contains("- XSOAR: `POST /incidents/search`"));

        let index = std::fs::read_to_string(&report.index).unwrap();
        assert!(index.contains("**Total Tools:** 5"));
        assert!(index.contains("(unified/incidents.md)"));
        assert!(index.contains("(xsoar/playbooks.md)"));
    }

    #[test]
    fn test_generate_docs_replaces_stale_pages() {
        let temp_dir = TempDir::new().unwrap();
        let stale = temp_dir.path().join("xsoar/old-category.md");
        std::fs::create_dir_all(stale.parent().unwrap()).unwrap();
        std::fs::write(&stale, "stale").unwrap();

        generate_docs(&[platform_registry(Platform::Xsoar, &["xsoar_list_all"])], temp_dir.path())
            .unwrap();

        assert!(!stale.exists());
        let page = std::fs::read_to_string(temp_dir.path().join("xsoar/other-operations.md")).unwrap();
        assert!(page.contains("This section documents 1 XSOAR tools related to other operations."));
    }
}
