//! The two fixed input schemas assigned to generated tools
//!
//! Per-parameter types from the spec are not encoded here; the upstream API
//! validates arguments.

use serde_json::{json, Map, Value};

/// Argument keys with fixed meaning in every tool call
pub const PATH_ARG: &str = "path";
pub const QUERY_ARG: &str = "query";
pub const HEADERS_ARG: &str = "headers";
pub const BODY_ARG: &str = "body";
pub const PLATFORM_ARG: &str = "platform";

fn common_properties() -> Map<String, Value> {
    let mut properties = Map::new();
    properties.insert(
        PATH_ARG.to_string(),
        json!({
            "type": "object",
            "description": "Path parameters substituted into the route template",
            "additionalProperties": true
        }),
    );
    properties.insert(
        QUERY_ARG.to_string(),
        json!({
            "type": "object",
            "description": "Query string parameters",
            "additionalProperties": true
        }),
    );
    properties.insert(
        HEADERS_ARG.to_string(),
        json!({
            "type": "object",
            "description": "Additional HTTP headers",
            "additionalProperties": true
        }),
    );
    properties.insert(
        BODY_ARG.to_string(),
        json!({ "description": "JSON request body" }),
    );
    properties
}

/// Schema of every platform-specific tool: all arguments optional
pub fn common_input_schema() -> Value {
    json!({
        "type": "object",
        "properties": common_properties(),
    })
}

/// Schema of every unified tool: the common arguments plus a required `platform`
pub fn unified_input_schema() -> Value {
    let mut properties = common_properties();
    properties.insert(
        PLATFORM_ARG.to_string(),
        json!({
            "type": "string",
            "enum": ["xsoar", "xsiam"],
            "description": "Platform to use - 'xsoar' or 'xsiam'"
        }),
    );

    json!({
        "type": "object",
        "properties": properties,
        "required": [PLATFORM_ARG],
    })
}
