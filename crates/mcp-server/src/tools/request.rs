//! Turn tool arguments into one concrete upstream request

use openapi_parser::HttpMethod;
use serde_json::{Map, Value};
use synapse_core::schema::{BODY_ARG, HEADERS_ARG, PATH_ARG, QUERY_ARG};
use synapse_core::{ArgumentLocation, HttpBinding};

use crate::error::InvocationError;

/// A fully resolved outbound request
#[derive(Debug, Clone, PartialEq)]
pub struct RequestPlan {
    pub method: HttpMethod,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl RequestPlan {
    /// Build a request for `binding` against `base_url`.
    ///
    /// Arguments come in two shapes that may be mixed:
    /// - containers: `path`, `query`, `headers` objects and a `body` value,
    ///   whose entries are used under the keys given
    /// - flat arguments named after a declared parameter (snake_case or
    ///   original wire name), placed in that parameter's location
    ///
    /// Container entries win over flat ones. Null values are treated as absent.
    pub fn build(
        binding: &HttpBinding,
        base_url: &str,
        args: &Map<String, Value>,
    ) -> Result<Self, InvocationError> {
        let path = bucket(binding, args, PATH_ARG, ArgumentLocation::Path)?;
        let query = bucket(binding, args, QUERY_ARG, ArgumentLocation::Query)?;
        let headers = bucket(binding, args, HEADERS_ARG, ArgumentLocation::Header)?;
        let body = body(binding, args)?;

        let route = substitute_route(&binding.route, &path)?;
        let url = join_url(base_url, &route)?;

        Ok(Self {
            method: binding.method,
            url,
            query: query
                .iter()
                .flat_map(|(name, value)| {
                    query_values(value).into_iter().map(move |v| (name.clone(), v))
                })
                .collect(),
            headers: headers
                .iter()
                .map(|(name, value)| (name.clone(), scalar_to_string(value)))
                .collect(),
            body,
        })
    }

    /// Whether a header with this name (case-insensitive) is already set
    pub fn has_header(&self, name: &str) -> bool {
        self.headers.iter().any(|(h, _)| h.eq_ignore_ascii_case(name))
    }
}

/// Flat argument value for a declared parameter, by snake_case or wire name
fn flat_value<'a>(args: &'a Map<String, Value>, arg_name: &str, wire_name: &str) -> Option<&'a Value> {
    args.get(arg_name)
        .or_else(|| args.get(wire_name))
        .filter(|v| !v.is_null())
}

/// Container object merged over the declared flat arguments for one location
fn bucket(
    binding: &HttpBinding,
    args: &Map<String, Value>,
    container: &str,
    location: ArgumentLocation,
) -> Result<Map<String, Value>, InvocationError> {
    let mut out = Map::new();

    for param in binding.parameters_in(location) {
        // a declared parameter named like a container is only reachable through the container
        if param.arg_name == container || param.name == container {
            continue;
        }
        if let Some(value) = flat_value(args, &param.arg_name, &param.name) {
            out.insert(param.name.clone(), value.clone());
        }
    }

    match args.get(container) {
        None | Some(Value::Null) => {}
        Some(Value::Object(explicit)) => {
            for (name, value) in explicit {
                if !value.is_null() {
                    out.insert(name.clone(), value.clone());
                }
            }
        }
        Some(other) => {
            return Err(InvocationError::InvalidArguments(format!(
                "'{}' must be an object, got {}",
                container,
                type_name(other)
            )))
        }
    }

    Ok(out)
}

fn body(binding: &HttpBinding, args: &Map<String, Value>) -> Result<Option<Value>, InvocationError> {
    let mut flat = Map::new();
    for param in binding.parameters_in(ArgumentLocation::Body) {
        if param.arg_name == BODY_ARG || param.name == BODY_ARG {
            continue;
        }
        if let Some(value) = flat_value(args, &param.arg_name, &param.name) {
            flat.insert(param.name.clone(), value.clone());
        }
    }

    match args.get(BODY_ARG) {
        None | Some(Value::Null) => Ok((!flat.is_empty()).then_some(Value::Object(flat))),
        Some(Value::Object(explicit)) => {
            flat.extend(explicit.iter().map(|(k, v)| (k.clone(), v.clone())));
            Ok((!flat.is_empty()).then_some(Value::Object(flat)))
        }
        Some(raw) if flat.is_empty() => Ok(Some(raw.clone())),
        Some(raw) => Err(InvocationError::InvalidArguments(format!(
            "'body' must be an object when body properties are also passed as arguments, got {}",
            type_name(raw)
        ))),
    }
}

/// Replace every `{name}` placeholder from the path bucket. Each value is
/// percent-encoded as a single path segment so it cannot leave the route.
fn substitute_route(route: &str, path: &Map<String, Value>) -> Result<String, InvocationError> {
    let mut out = String::with_capacity(route.len());
    let mut rest = route;

    while let Some(start) = rest.find('{') {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        let name = &rest[start + 1..start + len];
        let value = path
            .get(name)
            .ok_or_else(|| InvocationError::UnresolvedPathParameter(name.to_string()))?;

        out.push_str(&rest[..start]);
        out.push_str(&path_segment(name, value)?);
        rest = &rest[start + len + 1..];
    }

    out.push_str(rest);
    Ok(out)
}

fn path_segment(name: &str, value: &Value) -> Result<String, InvocationError> {
    let raw = scalar_to_string(value);
    // dot segments survive encoding and are collapsed by URL parsers
    if raw.is_empty() || raw == "." || raw == ".." {
        return Err(InvocationError::InvalidArguments(format!(
            "path parameter '{}' must be a non-empty segment, got '{}'",
            name, raw
        )));
    }
    Ok(urlencoding::encode(&raw).into_owned())
}

fn join_url(base_url: &str, route: &str) -> Result<String, InvocationError> {
    let url = format!("{}{}", base_url.trim_end_matches('/'), route);
    url::Url::parse(&url).map_err(|e| InvocationError::InvalidUrl {
        url: url.clone(),
        reason: e.to_string(),
    })?;
    Ok(url)
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Arrays repeat the key once per element
fn query_values(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter(|v| !v.is_null()).map(scalar_to_string).collect(),
        other => vec![scalar_to_string(other)],
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use synapse_core::BoundParameter;

    fn param(name: &str, arg_name: &str, location: ArgumentLocation) -> BoundParameter {
        BoundParameter {
            name: name.to_string(),
            arg_name: arg_name.to_string(),
            location,
            required: false,
        }
    }

    fn binding() -> HttpBinding {
        HttpBinding {
            base_url: "https://api.example.com/xsoar/".to_string(),
            route: "/incidents/{incidentId}/entries".to_string(),
            method: HttpMethod::Post,
            parameters: vec![
                param("incidentId", "incident_id", ArgumentLocation::Path),
                param("pageSize", "page_size", ArgumentLocation::Query),
                param("X-Request-Id", "x_request_id", ArgumentLocation::Header),
                param("contents", "contents", ArgumentLocation::Body),
                param("entryFormat", "entry_format", ArgumentLocation::Body),
            ],
        }
    }

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_flat_arguments_use_wire_names() {
        let binding = binding();
        let plan = RequestPlan::build(
            &binding,
            &binding.base_url,
            &args(json!({
                "incident_id": 42,
                "page_size": 10,
                "x_request_id": "abc",
                "contents": "note",
                "entry_format": null,
                "unrelated": true
            })),
        )
        .unwrap();

        assert_eq!(plan.method, HttpMethod::Post);
        assert_eq!(plan.url, "https://api.example.com/xsoar/incidents/42/entries");
        assert_eq!(plan.query, vec![("pageSize".to_string(), "10".to_string())]);
        assert_eq!(plan.headers, vec![("X-Request-Id".to_string(), "abc".to_string())]);
        assert_eq!(plan.body, Some(json!({"contents": "note"})));
    }

    #[test]
    fn test_containers_win_over_flat_arguments() {
        let binding = binding();
        let plan = RequestPlan::build(
            &binding,
            "https://api.example.com",
            &args(json!({
                "incidentId": "7",
                "path": {"incidentId": "8"},
                "query": {"pageSize": 5, "tags": ["a", "b"]},
                "body": {"contents": "explicit", "extra": 1},
                "contents": "flat"
            })),
        )
        .unwrap();

        assert_eq!(plan.url, "https://api.example.com/incidents/8/entries");
        assert!(plan.query.contains(&("pageSize".to_string(), "5".to_string())));
        assert!(plan.query.contains(&("tags".to_string(), "a".to_string())));
        assert!(plan.query.contains(&("tags".to_string(), "b".to_string())));
        assert_eq!(plan.body, Some(json!({"contents": "explicit", "extra": 1})));
    }

    #[test]
    fn test_path_values_stay_inside_route() {
        let binding = HttpBinding::bare("/incidents/{id}/entries", HttpMethod::Get);
        let plan = RequestPlan::build(
            &binding,
            "https://api.example.com/xsoar",
            &args(json!({"path": {"id": "../../admin?x=1#"}})),
        )
        .unwrap();

        assert_eq!(
            plan.url,
            "https://api.example.com/xsoar/incidents/..%2F..%2Fadmin%3Fx%3D1%23/entries"
        );
        let parsed = url::Url::parse(&plan.url).unwrap();
        assert!(parsed.path().starts_with("/xsoar/incidents/"));
        assert!(parsed.path().ends_with("/entries"));
        assert_eq!(parsed.query(), None);
        assert_eq!(parsed.fragment(), None);
    }

    #[test]
    fn test_dot_segment_path_values_are_rejected() {
        let binding = HttpBinding::bare("/incidents/{id}/entries", HttpMethod::Get);
        for id in ["..", ".", ""] {
            let err = RequestPlan::build(
                &binding,
                "https://api.example.com",
                &args(json!({"path": {"id": id}})),
            )
            .unwrap_err();
            assert!(matches!(err, InvocationError::InvalidArguments(msg) if msg.contains("'id'")));
        }
    }

    #[test]
    fn test_unresolved_placeholder_fails() {
        let binding = binding();
        let err = RequestPlan::build(&binding, &binding.base_url, &Map::new()).unwrap_err();
        assert!(matches!(err, InvocationError::UnresolvedPathParameter(name) if name == "incidentId"));
    }

    #[test]
    fn test_bare_binding_uses_containers_only() {
        let binding = HttpBinding::bare("/items/{id}", HttpMethod::Get);
        let plan = RequestPlan::build(
            &binding,
            "http://localhost:8080",
            &args(json!({"id": "ignored", "path": {"id": "x1"}, "query": {"q": "all"}})),
        )
        .unwrap();

        assert_eq!(plan.url, "http://localhost:8080/items/x1");
        assert_eq!(plan.query, vec![("q".to_string(), "all".to_string())]);
        assert_eq!(plan.body, None, "empty body is not sent");
    }

    #[test]
    fn test_raw_body_is_sent_as_is() {
        let binding = HttpBinding::bare("/automation/run", HttpMethod::Post);
        let plan = RequestPlan::build(
            &binding,
            "http://localhost",
            &args(json!({"body": ["a", "b"]})),
        )
        .unwrap();
        assert_eq!(plan.body, Some(json!(["a", "b"])));

        let err = RequestPlan::build(
            &self::binding(),
            "http://localhost",
            &args(json!({"incident_id": 1, "contents": "x", "body": "raw"})),
        )
        .unwrap_err();
        assert!(matches!(err, InvocationError::InvalidArguments(_)));
    }

    #[test]
    fn test_container_must_be_object() {
        let binding = HttpBinding::bare("/items", HttpMethod::Get);
        let err = RequestPlan::build(&binding, "http://localhost", &args(json!({"query": "q=1"})))
            .unwrap_err();
        assert!(matches!(err, InvocationError::InvalidArguments(msg) if msg.contains("'query'")));
    }

    #[test]
    fn test_missing_base_url_is_invalid() {
        let binding = HttpBinding::bare("/items", HttpMethod::Get);
        let err = RequestPlan::build(&binding, "", &Map::new()).unwrap_err();
        assert!(matches!(err, InvocationError::InvalidUrl { .. }));
    }
}
