//! Runtime settings
//!
//! Stored in an optional plain JSON file; environment variables override the
//! per-platform endpoint values.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{CoreError, Result};
use crate::platform::Platform;

/// Connection overrides for one upstream platform
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformEndpoint {
    /// Replaces the spec's `servers[0].url`
    pub base_url: Option<String>,
    /// Sent as the `Authorization` header
    pub api_key: Option<String>,
    /// Sent as the `x-xdr-auth-id` header
    pub api_key_id: Option<String>,
}

impl PlatformEndpoint {
    pub fn is_empty(&self) -> bool {
        self.base_url.is_none() && self.api_key.is_none() && self.api_key_id.is_none()
    }
}

impl std::fmt::Debug for PlatformEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformEndpoint")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_key_id", &self.api_key_id)
            .finish()
    }
}

/// Application settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Directory holding `generated_*_tools.json`
    pub generated_dir: PathBuf,
    /// Directory of markdown pages served as resources
    pub docs_dir: PathBuf,
    pub platforms: BTreeMap<Platform, PlatformEndpoint>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            generated_dir: PathBuf::from("generated"),
            docs_dir: PathBuf::from("docs"),
            platforms: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Load settings from `path`, falling back to defaults when no path is
    /// given or the file does not exist
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        if !path.exists() {
            debug!("No settings file at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&contents)
            .map_err(|e| CoreError::InvalidSettings(format!("{}: {}", path.display(), e)))?;
        debug!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Apply `CORTEXSYNAPSE_{PLATFORM}_{URL,API_KEY,API_KEY_ID}` from the process environment
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Apply endpoint overrides read through `lookup`. Empty values are ignored.
    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let read = |platform: Platform, suffix: &str| {
            lookup(&format!("CORTEXSYNAPSE_{}_{}", platform.label(), suffix))
                .filter(|v| !v.trim().is_empty())
        };

        for platform in Platform::ALL {
            let base_url = read(platform, "URL");
            let api_key = read(platform, "API_KEY");
            let api_key_id = read(platform, "API_KEY_ID");
            if base_url.is_none() && api_key.is_none() && api_key_id.is_none() {
                continue;
            }

            let endpoint = self.platforms.entry(platform).or_default();
            if base_url.is_some() {
                endpoint.base_url = base_url;
            }
            if api_key.is_some() {
                endpoint.api_key = api_key;
            }
            if api_key_id.is_some() {
                endpoint.api_key_id = api_key_id;
            }
            debug!("Applied {} endpoint overrides from environment", platform);
        }
    }

    pub fn endpoint(&self, platform: Platform) -> Option<&PlatformEndpoint> {
        self.platforms.get(&platform).filter(|e| !e.is_empty())
    }

    /// Check that every configured base URL is an absolute http(s) URL
    pub fn validate(&self) -> Result<()> {
        for (platform, endpoint) in &self.platforms {
            let Some(base_url) = &endpoint.base_url else {
                continue;
            };
            let parsed = url::Url::parse(base_url).map_err(|e| {
                CoreError::InvalidSettings(format!("{} base URL {:?}: {}", platform, base_url, e))
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(CoreError::InvalidSettings(format!(
                    "{} base URL {:?} must use http or https",
                    platform, base_url
                )));
            }
        }
        Ok(())
    }
}
