//! Markdown rendering for tool pages and the index

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::Write;

use super::categories::category_slug;
use super::DocTool;
use crate::platform::RegistrySource;

const RETURNS: &str = "A single text content item containing the raw upstream response body";

/// One bullet per schema property: `- `name` (type, required): description`
fn parameter_lines(schema: &Value) -> Vec<String> {
    let required: Vec<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|r| r.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return Vec::new();
    };

    let mut names: Vec<&String> = properties.keys().collect();
    // required arguments first, then alphabetical
    names.sort_by_key(|name| (!required.contains(&name.as_str()), name.as_str()));

    names
        .into_iter()
        .map(|name| {
            let prop = &properties[name];
            let kind = prop.get("type").and_then(Value::as_str).unwrap_or("any");
            let necessity = if required.contains(&name.as_str()) {
                "required"
            } else {
                "optional"
            };
            match prop.get("description").and_then(Value::as_str) {
                Some(desc) => format!("- `{name}` ({kind}, {necessity}): {desc}"),
                None => format!("- `{name}` ({kind}, {necessity})"),
            }
        })
        .collect()
}

/// Markdown section for a single tool
pub fn render_tool(tool: &DocTool) -> String {
    let mut doc = format!("### `{}`\n\n", tool.name);

    if tool.unified {
        doc.push_str("**Unified Tool** - Works with both XSOAR and XSIAM platforms\n\n");
    }

    let _ = writeln!(doc, "{}\n", tool.description);

    if !tool.endpoints.is_empty() {
        doc.push_str("**Endpoints:**\n\n");
        for (platform, endpoint) in &tool.endpoints {
            let _ = writeln!(doc, "- {}: `{}`", platform.label(), endpoint);
        }
        doc.push('\n');
    }

    let params = parameter_lines(&tool.schema);
    if params.is_empty() {
        doc.push_str("**Parameters:** None\n\n");
    } else {
        doc.push_str("**Parameters:**\n\n");
        for line in params {
            let _ = writeln!(doc, "{line}");
        }
        doc.push('\n');
    }

    let _ = writeln!(doc, "**Returns:** {RETURNS}\n");
    doc
}

/// A full category page, tools sorted by name
pub fn render_category(category: &str, tools: &[DocTool], source: RegistrySource) -> String {
    let mut doc = format!("# {category}\n\n");
    let _ = writeln!(
        doc,
        "This section documents {} {} tools related to {}.\n",
        tools.len(),
        source.as_str().to_uppercase(),
        category.to_lowercase()
    );
    doc.push_str("---\n\n");

    let mut sorted: Vec<&DocTool> = tools.iter().collect();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));

    for tool in sorted {
        doc.push_str(&render_tool(tool));
        doc.push_str("---\n\n");
    }

    doc
}

/// Category name -> tool count, per source
pub type CategoryCounts = BTreeMap<RegistrySource, BTreeMap<&'static str, usize>>;

fn render_source_links(doc: &mut String, source: RegistrySource, categories: &BTreeMap<&'static str, usize>) {
    for (category, count) in categories {
        let _ = writeln!(
            doc,
            "- **[{}]({}/{}.md)** ({} tools)",
            category,
            source.as_str(),
            category_slug(category),
            count
        );
    }
    doc.push('\n');
}

/// The top-level `README.md` linking every category page
pub fn render_index(counts: &CategoryCounts) -> String {
    let total_for = |source: RegistrySource| -> usize {
        counts.get(&source).map(|c| c.values().sum()).unwrap_or(0)
    };
    let unified = total_for(RegistrySource::Unified);
    let xsiam = total_for(RegistrySource::Xsiam);
    let xsoar = total_for(RegistrySource::Xsoar);

    let mut doc = String::from("# Cortex MCP Tools Documentation\n\n");
    doc.push_str(
        "This documentation describes every MCP tool available for Cortex XSIAM and XSOAR.\n\n",
    );
    let _ = writeln!(doc, "**Total Tools:** {}\n", unified + xsiam + xsoar);
    let _ = writeln!(doc, "- **Unified Tools:** {unified} (work with both platforms)");
    let _ = writeln!(doc, "- **XSIAM Tools:** {xsiam}");
    let _ = writeln!(doc, "- **XSOAR Tools:** {xsoar}\n");

    doc.push_str("## Documentation Structure\n\n");
    doc.push_str("Tools are organized by platform and functionality:\n\n");

    if let Some(categories) = counts.get(&RegistrySource::Unified).filter(|c| !c.is_empty()) {
        doc.push_str("### Unified Tools\n\n");
        doc.push_str(
            "These tools work with both XSOAR and XSIAM. Use the `platform` parameter to pick one.\n\n",
        );
        render_source_links(&mut doc, RegistrySource::Unified, categories);
    }

    for (source, heading) in [
        (RegistrySource::Xsiam, "### XSIAM Tools\n\n"),
        (RegistrySource::Xsoar, "### XSOAR Tools\n\n"),
    ] {
        doc.push_str(heading);
        if let Some(categories) = counts.get(&source) {
            render_source_links(&mut doc, source, categories);
        } else {
            doc.push_str("No tools generated.\n\n");
        }
    }

    doc.push_str("## Using the Tools\n\n");
    doc.push_str("Each tool page lists the tool's description, the upstream endpoint it calls, ");
    doc.push_str("its parameters and what it returns.\n\n");
    doc.push_str("Platform tools accept `path`, `query`, `headers` and `body` arguments. ");
    doc.push_str("Declared upstream parameters may also be passed as top-level snake_case arguments.\n\n");
    doc.push_str("**Unified Tools** additionally require a `platform` argument (`xsoar` or `xsiam`) ");
    doc.push_str("and route the call to that platform's endpoint.\n");

    doc
}
