//! Route + method lookup over a parsed spec

use crate::types::{ApiOperation, HttpMethod, ParsedSpec};

/// Find the operation declared at `route` for `method`.
///
/// The route must match a `paths` key exactly; templated segments are not
/// normalized, so `/items/{id}` and `/items/{itemId}` are different routes.
/// The method is compared case-insensitively. An unknown method string is
/// treated like any other miss.
pub fn find_operation_in_spec<'a>(
    spec: &'a ParsedSpec,
    route: &str,
    method: &str,
) -> Option<&'a ApiOperation> {
    let method: HttpMethod = method.parse().ok()?;
    spec.operations
        .iter()
        .find(|op| op.method == method && op.path == route)
}

impl ParsedSpec {
    /// See [`find_operation_in_spec`]
    pub fn find_operation(&self, route: &str, method: &str) -> Option<&ApiOperation> {
        find_operation_in_spec(self, route, method)
    }
}
