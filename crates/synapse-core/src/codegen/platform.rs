//! Platform-specific registry generation

use openapi_parser::{to_snake_case, HttpMethod, OpenApiParser, ParsedSpec};
use std::path::Path;
use tracing::{info, warn};

use super::{first_description, GenerationReport, SkippedEntry};
use crate::error::{CoreError, Result};
use crate::platform::Platform;
use crate::registry::{HttpBinding, ToolHandler, ToolRegistry};
use crate::schema::common_input_schema;
use crate::whitelist::{Whitelist, WhitelistEntry};

/// `{platform}_{key}` unless the normalized key already carries the prefix
fn tool_name(platform: Platform, key: &str, entry: &WhitelistEntry) -> Option<String> {
    let mut base = to_snake_case(key);
    if base.is_empty() {
        base = to_snake_case(entry.operation_id.as_deref().unwrap_or_default());
    }
    if base.is_empty() {
        return None;
    }

    let prefix = format!("{}_", platform.as_str());
    if base.starts_with(&prefix) {
        Some(base)
    } else {
        Some(format!("{prefix}{base}"))
    }
}

/// Build the registry for one platform without touching the filesystem
pub fn build_platform_registry(
    spec: &ParsedSpec,
    whitelist: &Whitelist,
    platform: Platform,
) -> (ToolRegistry, Vec<SkippedEntry>) {
    let mut registry = ToolRegistry::new(platform.into());
    let mut skipped = Vec::new();

    let Some(entries) = whitelist.platform_entries(platform) else {
        warn!("Whitelist has no {} section; registry will be empty", platform);
        return (registry, skipped);
    };

    for (key, entry) in entries {
        let Some(name) = tool_name(platform, key, entry) else {
            warn!("Skipping {} whitelist entry {:?}: empty tool name", platform, key);
            skipped.push(SkippedEntry::new(key, "empty tool name"));
            continue;
        };

        if entry.method.parse::<HttpMethod>().is_err() {
            warn!("Skipping {}: invalid method {:?}", name, entry.method);
            skipped.push(SkippedEntry::new(key, format!("invalid method {}", entry.method)));
            continue;
        }

        let Some(operation) = spec.find_operation(&entry.route, &entry.method) else {
            warn!(
                "Skipping {}: {} {} not found in {} spec",
                name, entry.method, entry.route, platform
            );
            skipped.push(SkippedEntry::new(
                key,
                format!("{} {} not found in spec", entry.method, entry.route),
            ));
            continue;
        };

        if let Some(expected) = &entry.operation_id {
            if *expected != operation.operation_id {
                warn!(
                    "{}: whitelist operationId {} differs from spec operationId {}",
                    name, expected, operation.operation_id
                );
            }
        }

        let description = first_description([
            entry.description.as_deref(),
            operation.summary.as_deref(),
            operation.description.as_deref(),
        ])
        .unwrap_or_else(|| format!("{} {}", operation.method, operation.path));

        let handler = ToolHandler::Platform {
            platform,
            binding: HttpBinding::from_operation(operation, spec.base_url()),
        };

        if let Err(e) = registry.insert(name.as_str(), handler, common_input_schema(), description) {
            warn!("Skipping {}: {}", key, e);
            skipped.push(SkippedEntry::new(key, format!("tool name {name} already generated")));
        }
    }

    (registry, skipped)
}

/// Generate `generated_{platform}_tools.json` in `output_dir` from one spec file
pub fn generate_platform_tools_file(
    spec_path: &Path,
    output_dir: &Path,
    whitelist: &Whitelist,
    platform: Platform,
) -> Result<GenerationReport> {
    let spec = OpenApiParser::from_file(spec_path).map_err(|source| CoreError::InvalidSpec {
        path: spec_path.to_path_buf(),
        source,
    })?;

    let (registry, skipped) = build_platform_registry(&spec, whitelist, platform);
    let output = registry.save(output_dir)?;

    info!(
        "Generated {:?}: {} tools, {} skipped",
        output,
        registry.len(),
        skipped.len()
    );

    Ok(GenerationReport {
        source: registry.source,
        output,
        emitted: registry.len(),
        skipped,
    })
}
