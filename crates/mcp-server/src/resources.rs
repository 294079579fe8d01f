//! Generated documentation exposed as MCP resources

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::Result;
use crate::protocol::{McpError, McpResource, ResourceContents};

/// URI scheme of documentation resources
pub const DOCS_SCHEME: &str = "cortexsynapse-docs://";

const MARKDOWN_MIME: &str = "text/markdown";

#[derive(Debug, Clone)]
struct DocFile {
    /// Path relative to the docs directory, `/`-separated
    name: String,
    path: PathBuf,
}

/// Markdown files found under the docs directory at startup
#[derive(Debug, Clone, Default)]
pub struct DocResources {
    files: BTreeMap<String, DocFile>,
}

impl DocResources {
    /// Scan `docs_dir` once. A missing directory yields an empty set.
    pub fn scan(docs_dir: &Path) -> Result<Self> {
        if !docs_dir.is_dir() {
            warn!("Docs directory {:?} not found, no resources will be served", docs_dir);
            return Ok(Self::default());
        }

        let mut files = BTreeMap::new();
        for entry in WalkDir::new(docs_dir).sort_by_file_name() {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type().is_file() || path.extension().map_or(true, |ext| ext != "md") {
                continue;
            }

            let Ok(relative) = path.strip_prefix(docs_dir) else {
                continue;
            };
            let name = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            let uri = format!("{}{}", DOCS_SCHEME, name);

            debug!("Found doc resource {}", uri);
            files.insert(
                uri,
                DocFile {
                    name,
                    path: path.to_path_buf(),
                },
            );
        }

        info!("Serving {} documentation resources from {:?}", files.len(), docs_dir);
        Ok(Self { files })
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// All resources sorted by URI. Sizes are read from disk at call time.
    pub fn list(&self) -> Vec<McpResource> {
        self.files
            .iter()
            .map(|(uri, file)| McpResource {
                uri: uri.clone(),
                name: file.name.clone(),
                description: None,
                mime_type: Some(MARKDOWN_MIME.to_string()),
                size: std::fs::metadata(&file.path).ok().map(|m| m.len()),
            })
            .collect()
    }

    /// Raw text of one resource. Unknown URIs are a request-level error.
    pub async fn read(&self, uri: &str) -> std::result::Result<ResourceContents, McpError> {
        let file = self
            .files
            .get(uri)
            .ok_or_else(|| McpError::resource_not_found(uri))?;

        let text = tokio::fs::read_to_string(&file.path)
            .await
            .map_err(|e| McpError::internal_error(format!("Failed to read {}: {}", uri, e)))?;

        Ok(ResourceContents {
            uri: uri.to_string(),
            mime_type: Some(MARKDOWN_MIME.to_string()),
            text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn docs_dir() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        std::fs::create_dir_all(root.join("xsiam")).unwrap();
        std::fs::write(root.join("README.md"), "# Index\n").unwrap();
        std::fs::write(root.join("xsiam/incidents.md"), "# Incidents\n").unwrap();
        std::fs::write(root.join("xsiam/notes.txt"), "ignored").unwrap();
        temp_dir
    }

    #[test]
    fn test_scan_lists_markdown_only() {
        let temp_dir = docs_dir();
        let resources = DocResources::scan(temp_dir.path()).unwrap();

        let listed = resources.list();
        let uris: Vec<_> = listed.iter().map(|r| r.uri.as_str()).collect();
        assert_eq!(
            uris,
            vec!["cortexsynapse-docs://README.md", "cortexsynapse-docs://xsiam/incidents.md"]
        );
        assert_eq!(listed[1].name, "xsiam/incidents.md");
        assert_eq!(listed[1].mime_type.as_deref(), Some("text/markdown"));
        assert_eq!(listed[1].size, Some(12));
    }

    #[test]
    fn test_missing_dir_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let resources = DocResources::scan(&temp_dir.path().join("docs")).unwrap();
        assert!(resources.is_empty());
    }

    #[tokio::test]
    async fn test_read_resource() {
        let temp_dir = docs_dir();
        let resources = DocResources::scan(temp_dir.path()).unwrap();

        let contents = resources.read("cortexsynapse-docs://xsiam/incidents.md").await.unwrap();
        assert_eq!(contents.text, "# Incidents\n");

        let err = resources.read("cortexsynapse-docs://xsoar/nope.md").await.unwrap_err();
        assert_eq!(err.code, -32002);
    }

    #[test]
    fn test_set_is_fixed_after_scan() {
        let temp_dir = docs_dir();
        let resources = DocResources::scan(temp_dir.path()).unwrap();
        std::fs::write(temp_dir.path().join("late.md"), "# Late\n").unwrap();
        assert_eq!(resources.len(), 2);
    }
}
