//! Unified registry generation: one tool per logical operation, routed by platform

use openapi_parser::{HttpMethod, ParsedSpec};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

use super::{first_description, GenerationReport, SkippedEntry};
use crate::error::Result;
use crate::platform::{Platform, RegistrySource};
use crate::registry::{HttpBinding, ToolHandler, ToolRegistry};
use crate::schema::unified_input_schema;
use crate::whitelist::{RouteBinding, Whitelist};

fn spec_for<'a>(
    platform: Platform,
    xsiam_spec: Option<&'a ParsedSpec>,
    xsoar_spec: Option<&'a ParsedSpec>,
) -> Option<&'a ParsedSpec> {
    match platform {
        Platform::Xsiam => xsiam_spec,
        Platform::Xsoar => xsoar_spec,
    }
}

/// Bind one platform route. A route missing from an available spec still
/// produces a bare binding; only an unparseable method drops it.
fn bind(
    name: &str,
    platform: Platform,
    route: &RouteBinding,
    spec: Option<&ParsedSpec>,
) -> Option<HttpBinding> {
    let method: HttpMethod = match route.method.parse() {
        Ok(method) => method,
        Err(_) => {
            warn!("{}: invalid {} method {:?}, binding dropped", name, platform, route.method);
            return None;
        }
    };

    let Some(spec) = spec else {
        return Some(HttpBinding::bare(&route.route, method));
    };

    match spec.find_operation(&route.route, &route.method) {
        Some(operation) => Some(HttpBinding::from_operation(operation, spec.base_url())),
        None => {
            warn!(
                "{}: {} {} not found in {} spec, binding without declared parameters",
                name, route.method, route.route, platform
            );
            let mut binding = HttpBinding::bare(&route.route, method);
            binding.base_url = spec.base_url().to_string();
            Some(binding)
        }
    }
}

/// Build the unified registry without touching the filesystem
pub fn build_unified_registry(
    whitelist: &Whitelist,
    xsiam_spec: Option<&ParsedSpec>,
    xsoar_spec: Option<&ParsedSpec>,
) -> (ToolRegistry, Vec<SkippedEntry>) {
    let mut registry = ToolRegistry::new(RegistrySource::Unified);
    let mut skipped = Vec::new();

    for (key, entry) in &whitelist.unified {
        let bindings: BTreeMap<Platform, HttpBinding> = Platform::ALL
            .into_iter()
            .filter_map(|platform| {
                let route = entry.binding(platform)?;
                let spec = spec_for(platform, xsiam_spec, xsoar_spec);
                bind(key, platform, route, spec).map(|b| (platform, b))
            })
            .collect();

        if bindings.is_empty() {
            warn!("Skipping unified entry {}: no usable platform binding", key);
            skipped.push(SkippedEntry::new(key, "no usable platform binding"));
            continue;
        }

        let description = first_description([entry.description.as_deref()]).unwrap_or_else(|| {
            let platforms: Vec<&str> = bindings.keys().map(Platform::label).collect();
            format!("{} ({})", key, platforms.join(", "))
        });

        let handler = ToolHandler::Unified { bindings };
        if let Err(e) = registry.insert(key.as_str(), handler, unified_input_schema(), description) {
            warn!("Skipping unified entry {}: {}", key, e);
            skipped.push(SkippedEntry::new(key, "duplicate tool name"));
        }
    }

    (registry, skipped)
}

/// Generate `generated_unified_tools.json` in `output_dir`
pub fn generate_unified_tools_file(
    whitelist: &Whitelist,
    xsiam_spec: Option<&ParsedSpec>,
    xsoar_spec: Option<&ParsedSpec>,
    output_dir: &Path,
) -> Result<GenerationReport> {
    let (registry, skipped) = build_unified_registry(whitelist, xsiam_spec, xsoar_spec);
    let output = registry.save(output_dir)?;

    info!(
        "Generated {:?}: {} unified tools, {} skipped",
        output,
        registry.len(),
        skipped.len()
    );

    Ok(GenerationReport {
        source: RegistrySource::Unified,
        output,
        emitted: registry.len(),
        skipped,
    })
}
