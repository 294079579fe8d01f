//! Whitelist of upstream operations allowed to become tools

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use crate::error::{CoreError, Result};
use crate::platform::Platform;

/// A single allowed operation on one platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhitelistEntry {
    /// Route exactly as keyed under the spec's `paths`
    pub route: String,
    /// HTTP method as written in the whitelist (matched case-insensitively)
    pub method: String,
    #[serde(rename = "operationId", default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Route and method of a unified tool on one platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteBinding {
    pub route: String,
    pub method: String,
}

/// A logical operation available on one or both platforms
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnifiedEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xsoar: Option<RouteBinding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xsiam: Option<RouteBinding>,
}

impl UnifiedEntry {
    /// Route binding for `platform`, if the entry supports it
    pub fn binding(&self, platform: Platform) -> Option<&RouteBinding> {
        match platform {
            Platform::Xsiam => self.xsiam.as_ref(),
            Platform::Xsoar => self.xsoar.as_ref(),
        }
    }
}

/// The whole whitelist file.
///
/// Top-level keys other than `unified` are platform sections. Unknown platform
/// keys are kept so that a load/dump cycle reproduces the file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Whitelist {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub unified: BTreeMap<String, UnifiedEntry>,
    #[serde(flatten)]
    pub platforms: BTreeMap<String, BTreeMap<String, WhitelistEntry>>,
}

impl Whitelist {
    /// Load a whitelist from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let whitelist: Whitelist =
            serde_json::from_str(&contents).map_err(|source| CoreError::InvalidWhitelist {
                path: path.to_path_buf(),
                source,
            })?;

        debug!(
            "Loaded whitelist from {:?}: {} platform sections, {} unified entries",
            path,
            whitelist.platforms.len(),
            whitelist.unified.len()
        );
        Ok(whitelist)
    }

    /// Write the whitelist as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Entries for one platform, `None` if the file has no section for it
    pub fn platform_entries(&self, platform: Platform) -> Option<&BTreeMap<String, WhitelistEntry>> {
        self.platforms.get(platform.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn sample() -> serde_json::Value {
        json!({
            "xsiam": {
                "get_incidents": {
                    "route": "/public_api/v1/incidents/get_incidents",
                    "method": "POST",
                    "operationId": "getIncidents",
                    "description": "Get a list of incidents"
                }
            },
            "xsoar": {
                "tool": {"route": "/test", "method": "get"}
            },
            "unified": {
                "get_incidents": {
                    "description": "Fetch incidents from a platform",
                    "xsoar": {"route": "/incidents/search", "method": "POST"},
                    "xsiam": {"route": "/public_api/v1/incidents/get_incidents", "method": "POST"}
                }
            }
        })
    }

    #[test]
    fn test_load_reads_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("whitelist.json");
        let data = json!({"xsoar": {"tool": {"route": "/test", "method": "GET"}}});
        std::fs::write(&path, data.to_string()).unwrap();

        let loaded = Whitelist::load(&path).unwrap();
        let entry = &loaded.platform_entries(Platform::Xsoar).unwrap()["tool"];
        assert_eq!(entry.route, "/test");
        assert_eq!(entry.method, "GET");
        assert!(loaded.unified.is_empty());
        assert!(loaded.platform_entries(Platform::Xsiam).is_none());

        assert_eq!(serde_json::to_value(&loaded).unwrap(), data);
    }

    #[test]
    fn test_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("whitelist.json");

        let original: Whitelist = serde_json::from_value(sample()).unwrap();
        original.save(&path).unwrap();
        let reloaded = Whitelist::load(&path).unwrap();

        assert_eq!(reloaded, original);
        assert_eq!(serde_json::to_value(&reloaded).unwrap(), sample());
    }

    #[test]
    fn test_unified_bindings() {
        let whitelist: Whitelist = serde_json::from_value(sample()).unwrap();
        let entry = &whitelist.unified["get_incidents"];

        assert_eq!(entry.binding(Platform::Xsoar).unwrap().route, "/incidents/search");
        assert_eq!(entry.binding(Platform::Xsiam).unwrap().method, "POST");
    }

    #[test]
    fn test_malformed_whitelist_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("whitelist.json");
        std::fs::write(&path, r#"{"xsiam": {"tool": {"method": "GET"}}}"#).unwrap();

        let err = Whitelist::load(&path).unwrap_err();
        assert!(matches!(err, CoreError::InvalidWhitelist { .. }));
    }
}
