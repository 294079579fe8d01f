//! Upstream platforms and the registry sources derived from them

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::CoreError;

/// An upstream platform with its own OpenAPI spec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Xsiam,
    Xsoar,
}

impl Platform {
    pub const ALL: [Platform; 2] = [Platform::Xsiam, Platform::Xsoar];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Xsiam => "xsiam",
            Platform::Xsoar => "xsoar",
        }
    }

    /// Upper-case label used in prose and environment variable names
    pub fn label(&self) -> &'static str {
        match self {
            Platform::Xsiam => "XSIAM",
            Platform::Xsoar => "XSOAR",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exact, lowercase match only: the `platform` tool argument is an enum.
impl FromStr for Platform {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Platform::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| CoreError::UnknownPlatform(s.to_string()))
    }
}

/// Which generated artifact a tool came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrySource {
    Xsiam,
    Xsoar,
    Unified,
}

impl RegistrySource {
    pub const ALL: [RegistrySource; 3] = [
        RegistrySource::Xsiam,
        RegistrySource::Xsoar,
        RegistrySource::Unified,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrySource::Xsiam => "xsiam",
            RegistrySource::Xsoar => "xsoar",
            RegistrySource::Unified => "unified",
        }
    }

    /// File name of the generated artifact for this source
    pub fn file_name(&self) -> String {
        format!("generated_{}_tools.json", self.as_str())
    }

    /// Only the unified registry may be absent at server start
    pub fn is_required(&self) -> bool {
        !matches!(self, RegistrySource::Unified)
    }
}

impl From<Platform> for RegistrySource {
    fn from(platform: Platform) -> Self {
        match platform {
            Platform::Xsiam => RegistrySource::Xsiam,
            Platform::Xsoar => RegistrySource::Xsoar,
        }
    }
}

impl std::fmt::Display for RegistrySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
