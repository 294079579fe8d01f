//! Declarative handler records stored in generated registries

use openapi_parser::{to_snake_case, ApiOperation, HttpMethod, ParameterLocation};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::platform::Platform;

/// Where a declared argument goes in the outbound request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgumentLocation {
    Path,
    Query,
    Header,
    Body,
}

/// A parameter or body property the upstream operation declares
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundParameter {
    /// Original wire name, used in the outbound request
    pub name: String,
    /// Normalized name accepted as a flat tool argument
    pub arg_name: String,
    pub location: ArgumentLocation,
    #[serde(default)]
    pub required: bool,
}

/// Everything needed to issue one upstream request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpBinding {
    /// `servers[0].url` of the platform spec, empty when unknown
    #[serde(default)]
    pub base_url: String,
    /// Route template with `{param}` placeholders
    pub route: String,
    pub method: HttpMethod,
    #[serde(default)]
    pub parameters: Vec<BoundParameter>,
}

impl HttpBinding {
    /// A binding with no declared parameters, used when the operation is not
    /// available in a spec
    pub fn bare(route: &str, method: HttpMethod) -> Self {
        Self {
            base_url: String::new(),
            route: route.to_string(),
            method,
            parameters: Vec::new(),
        }
    }

    /// Bind an operation resolved from a spec
    pub fn from_operation(operation: &ApiOperation, base_url: &str) -> Self {
        let mut parameters: Vec<BoundParameter> = operation
            .parameters
            .iter()
            .filter_map(|p| {
                let location = match p.location {
                    ParameterLocation::Path => ArgumentLocation::Path,
                    ParameterLocation::Query => ArgumentLocation::Query,
                    ParameterLocation::Header => ArgumentLocation::Header,
                    ParameterLocation::Cookie => return None,
                };
                Some(BoundParameter {
                    name: p.name.clone(),
                    arg_name: to_snake_case(&p.name),
                    location,
                    required: p.required,
                })
            })
            .collect();

        if let Some(body) = &operation.request_body {
            let required = body.required_properties();
            parameters.extend(body.property_names().into_iter().map(|name| BoundParameter {
                arg_name: to_snake_case(&name),
                required: body.required && required.contains(&name),
                name,
                location: ArgumentLocation::Body,
            }));
        }

        Self {
            base_url: base_url.to_string(),
            route: operation.path.clone(),
            method: operation.method,
            parameters,
        }
    }

    /// Parameters declared at `location`
    pub fn parameters_in(&self, location: ArgumentLocation) -> impl Iterator<Item = &BoundParameter> {
        self.parameters.iter().filter(move |p| p.location == location)
    }
}

/// How a tool reaches its upstream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ToolHandler {
    /// Always calls one platform
    Platform {
        platform: Platform,
        binding: HttpBinding,
    },
    /// Calls the platform named by the `platform` argument
    Unified {
        bindings: BTreeMap<Platform, HttpBinding>,
    },
}

impl ToolHandler {
    pub fn is_unified(&self) -> bool {
        matches!(self, ToolHandler::Unified { .. })
    }

    /// Bindings this handler can dispatch to, in platform order
    pub fn bindings(&self) -> Vec<(Platform, &HttpBinding)> {
        match self {
            ToolHandler::Platform { platform, binding } => vec![(*platform, binding)],
            ToolHandler::Unified { bindings } => bindings.iter().map(|(p, b)| (*p, b)).collect(),
        }
    }
}
