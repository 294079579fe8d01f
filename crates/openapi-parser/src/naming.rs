//! Identifier normalization shared by tool names and argument names

use regex::Regex;
use std::sync::LazyLock;

/// `xY` / `9Y` boundaries
static LOWER_UPPER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z0-9])([A-Z])").expect("valid regex"));

/// A capitalized word following any character (`HTTPResponse` -> `HTTP_Response`)
static WORD_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(.)([A-Z][a-z]+)").expect("valid regex"));

/// Convert an arbitrary identifier to lowercase snake_case.
///
/// Any non-alphanumeric ASCII character becomes a separator, camel-case
/// boundaries become separators, runs of separators collapse to one and
/// leading/trailing separators are dropped. The result only contains
/// `[a-z0-9_]`, so applying the function twice yields the same string.
///
/// ```
/// use openapi_parser::to_snake_case;
///
/// assert_eq!(to_snake_case("ListIncidents"), "list_incidents");
/// assert_eq!(to_snake_case("create-Widget/Item"), "create_widget_item");
/// assert_eq!(to_snake_case("HTTPResponse2XX"), "http_response2_xx");
/// ```
pub fn to_snake_case(name: &str) -> String {
    let separated: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();

    let split = WORD_START.replace_all(&separated, "${1}_${2}");
    let split = LOWER_UPPER.replace_all(&split, "${1}_${2}");

    let mut result = String::with_capacity(split.len());
    for c in split.chars() {
        if c == '_' {
            if !result.is_empty() && !result.ends_with('_') {
                result.push('_');
            }
        } else {
            result.push(c.to_ascii_lowercase());
        }
    }

    if result.ends_with('_') {
        result.pop();
    }
    result
}
