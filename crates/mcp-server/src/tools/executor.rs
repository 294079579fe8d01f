//! Execute tools by making HTTP requests to the selected platform

use async_trait::async_trait;
use openapi_parser::HttpMethod;
use reqwest::Client;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use synapse_core::schema::PLATFORM_ARG;
use synapse_core::{HttpBinding, Platform, PlatformEndpoint, Settings, ToolHandler};
use tracing::{debug, error, info};

use super::request::RequestPlan;
use crate::error::{InvocationError, ServerError};

/// Header carrying the API key
pub const AUTHORIZATION_HEADER: &str = "Authorization";
/// Header carrying the API key id (Cortex advanced keys)
pub const AUTH_ID_HEADER: &str = "x-xdr-auth-id";

/// Sends a planned request and returns the raw response body
#[async_trait]
pub trait Upstream: Send + Sync {
    async fn send(&self, plan: RequestPlan) -> Result<String, InvocationError>;
}

/// `Upstream` backed by a shared reqwest client
pub struct HttpUpstream {
    client: Client,
}

impl HttpUpstream {
    /// No request timeout is set; the upstream decides how long a call takes.
    pub fn new() -> Result<Self, ServerError> {
        let client = Client::builder()
            .user_agent(concat!("cortexsynapse/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

fn to_reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Patch => reqwest::Method::PATCH,
        HttpMethod::Delete => reqwest::Method::DELETE,
        HttpMethod::Head => reqwest::Method::HEAD,
        HttpMethod::Options => reqwest::Method::OPTIONS,
        HttpMethod::Trace => reqwest::Method::TRACE,
    }
}

#[async_trait]
impl Upstream for HttpUpstream {
    async fn send(&self, plan: RequestPlan) -> Result<String, InvocationError> {
        let method = to_reqwest_method(plan.method);
        info!("Executing {} {}", method, plan.url);

        let mut request = self.client.request(method, &plan.url);
        if !plan.query.is_empty() {
            request = request.query(&plan.query);
        }
        for (name, value) in &plan.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &plan.body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| InvocationError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| InvocationError::Transport(format!("Failed to read response: {}", e)))?;

        debug!("Response status: {}", status);

        if status.is_success() {
            Ok(text)
        } else {
            error!("Request failed with status {}: {}", status, text);
            Err(InvocationError::UpstreamStatus {
                status: status.as_u16(),
                body: text,
            })
        }
    }
}

/// Resolves a handler against the caller's arguments and runs it
pub struct ToolExecutor {
    upstream: Arc<dyn Upstream>,
    endpoints: BTreeMap<Platform, PlatformEndpoint>,
}

impl ToolExecutor {
    pub fn new(upstream: Arc<dyn Upstream>) -> Self {
        Self {
            upstream,
            endpoints: BTreeMap::new(),
        }
    }

    /// Apply base URL and credential overrides from settings
    pub fn with_settings(mut self, settings: &Settings) -> Self {
        self.endpoints = Platform::ALL
            .into_iter()
            .filter_map(|p| settings.endpoint(p).map(|e| (p, e.clone())))
            .collect();
        self
    }

    /// Run `handler` with the given arguments and return the raw response text
    pub async fn execute(
        &self,
        tool_name: &str,
        handler: &ToolHandler,
        arguments: Option<Value>,
    ) -> Result<String, InvocationError> {
        let mut args = match arguments {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(map)) => map,
            Some(_) => {
                return Err(InvocationError::InvalidArguments(
                    "arguments must be an object".to_string(),
                ))
            }
        };

        let (platform, binding) = select_binding(tool_name, handler, &mut args)?;
        let endpoint = self.endpoints.get(&platform);

        let base_url = endpoint
            .and_then(|e| e.base_url.as_deref())
            .unwrap_or(&binding.base_url);
        if base_url.is_empty() {
            return Err(InvocationError::MissingBaseUrl(platform));
        }

        let mut plan = RequestPlan::build(binding, base_url, &args)?;
        if let Some(endpoint) = endpoint {
            apply_credentials(&mut plan, endpoint);
        }

        debug!("Executing tool {} on {}: {} {}", tool_name, platform, plan.method, plan.url);
        self.upstream.send(plan).await
    }
}

/// Pick the binding to call. Unified tools consume the `platform` argument.
fn select_binding<'a>(
    tool_name: &str,
    handler: &'a ToolHandler,
    args: &mut Map<String, Value>,
) -> Result<(Platform, &'a HttpBinding), InvocationError> {
    match handler {
        ToolHandler::Platform { platform, binding } => Ok((*platform, binding)),
        ToolHandler::Unified { bindings } => {
            let platform = match args.remove(PLATFORM_ARG) {
                None | Some(Value::Null) => return Err(InvocationError::MissingPlatform),
                Some(Value::String(s)) => s
                    .parse::<Platform>()
                    .map_err(|_| InvocationError::UnsupportedPlatform(s))?,
                Some(other) => return Err(InvocationError::UnsupportedPlatform(other.to_string())),
            };
            let binding = bindings.get(&platform).ok_or_else(|| InvocationError::NoBinding {
                tool: tool_name.to_string(),
                platform,
            })?;
            Ok((platform, binding))
        }
    }
}

/// Configured credentials never replace headers the caller passed explicitly
fn apply_credentials(plan: &mut RequestPlan, endpoint: &PlatformEndpoint) {
    if let Some(key) = &endpoint.api_key {
        if !plan.has_header(AUTHORIZATION_HEADER) {
            plan.headers.push((AUTHORIZATION_HEADER.to_string(), key.clone()));
        }
    }
    if let Some(key_id) = &endpoint.api_key_id {
        if !plan.has_header(AUTH_ID_HEADER) {
            plan.headers.push((AUTH_ID_HEADER.to_string(), key_id.clone()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Records every plan and answers with a fixed body
    #[derive(Default)]
    struct Recording {
        plans: Mutex<Vec<RequestPlan>>,
    }

    #[async_trait]
    impl Upstream for Recording {
        async fn send(&self, plan: RequestPlan) -> Result<String, InvocationError> {
            self.plans.lock().unwrap().push(plan);
            Ok("ok".to_string())
        }
    }

    fn unified_handler() -> ToolHandler {
        let mut xsoar = HttpBinding::bare("/incidents/search", HttpMethod::Post);
        xsoar.base_url = "https://xsoar.example.com".to_string();
        let mut xsiam = HttpBinding::bare("/public_api/v1/incidents/get_incidents", HttpMethod::Post);
        xsiam.base_url = "https://xsiam.example.com".to_string();

        ToolHandler::Unified {
            bindings: BTreeMap::from([(Platform::Xsoar, xsoar), (Platform::Xsiam, xsiam)]),
        }
    }

    #[tokio::test]
    async fn test_unified_routes_by_platform() {
        let upstream = Arc::new(Recording::default());
        let executor = ToolExecutor::new(upstream.clone());
        let handler = unified_handler();

        executor
            .execute("get_incidents", &handler, Some(json!({"platform": "xsoar", "body": {"filter": {}}})))
            .await
            .unwrap();
        executor
            .execute("get_incidents", &handler, Some(json!({"platform": "xsiam"})))
            .await
            .unwrap();

        let plans = upstream.plans.lock().unwrap();
        assert_eq!(plans[0].url, "https://xsoar.example.com/incidents/search");
        assert_eq!(plans[0].body, Some(json!({"filter": {}})));
        assert_eq!(plans[1].url, "https://xsiam.example.com/public_api/v1/incidents/get_incidents");
        assert_eq!(plans[1].body, None);
    }

    #[tokio::test]
    async fn test_unified_requires_supported_platform() {
        let executor = ToolExecutor::new(Arc::new(Recording::default()));
        let handler = unified_handler();

        let err = executor.execute("get_incidents", &handler, None).await.unwrap_err();
        assert!(matches!(err, InvocationError::MissingPlatform));

        let err = executor
            .execute("get_incidents", &handler, Some(json!({"platform": "xdr"})))
            .await
            .unwrap_err();
        assert!(matches!(err, InvocationError::UnsupportedPlatform(p) if p == "xdr"));

        let single = ToolHandler::Unified {
            bindings: BTreeMap::from([(Platform::Xsoar, HttpBinding::bare("/automation", HttpMethod::Post))]),
        };
        let err = executor
            .execute("run_script", &single, Some(json!({"platform": "xsiam"})))
            .await
            .unwrap_err();
        assert!(matches!(err, InvocationError::NoBinding { platform: Platform::Xsiam, .. }));
    }

    #[tokio::test]
    async fn test_settings_override_base_url_and_add_credentials() {
        let upstream = Arc::new(Recording::default());
        let mut settings = Settings::default();
        settings.platforms.insert(
            Platform::Xsiam,
            PlatformEndpoint {
                base_url: Some("https://api-tenant.example.com".into()),
                api_key: Some("secret".into()),
                api_key_id: Some("12".into()),
            },
        );
        let executor = ToolExecutor::new(upstream.clone()).with_settings(&settings);

        let handler = ToolHandler::Platform {
            platform: Platform::Xsiam,
            binding: HttpBinding::bare("/public_api/v1/alerts/get_alerts", HttpMethod::Post),
        };
        executor
            .execute("xsiam_get_alerts", &handler, Some(json!({"headers": {"authorization": "mine"}})))
            .await
            .unwrap();

        let plans = upstream.plans.lock().unwrap();
        assert_eq!(plans[0].url, "https://api-tenant.example.com/public_api/v1/alerts/get_alerts");
        assert!(plans[0].headers.contains(&("authorization".to_string(), "mine".to_string())));
        assert!(!plans[0].headers.iter().any(|(_, v)| v == "secret"));
        assert!(plans[0].headers.contains(&(AUTH_ID_HEADER.to_string(), "12".to_string())));
    }

    #[tokio::test]
    async fn test_missing_base_url() {
        let executor = ToolExecutor::new(Arc::new(Recording::default()));
        let handler = ToolHandler::Platform {
            platform: Platform::Xsoar,
            binding: HttpBinding::bare("/incidents", HttpMethod::Get),
        };
        let err = executor.execute("xsoar_incidents", &handler, None).await.unwrap_err();
        assert!(matches!(err, InvocationError::MissingBaseUrl(Platform::Xsoar)));
    }

    #[tokio::test]
    async fn test_non_object_arguments_rejected() {
        let executor = ToolExecutor::new(Arc::new(Recording::default()));
        let err = executor
            .execute("get_incidents", &unified_handler(), Some(json!(["xsoar"])))
            .await
            .unwrap_err();
        assert!(matches!(err, InvocationError::InvalidArguments(_)));
    }

    #[tokio::test]
    async fn test_http_upstream_returns_raw_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/incidents/7/entries"))
            .and(query_param("pageSize", "5"))
            .and(header("Authorization", "secret"))
            .and(body_json(json!({"contents": "note"})))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"id\": \"e1\"}"))
            .expect(1)
            .mount(&server)
            .await;

        let upstream = HttpUpstream::new().unwrap();
        let plan = RequestPlan {
            method: HttpMethod::Post,
            url: format!("{}/incidents/7/entries", server.uri()),
            query: vec![("pageSize".into(), "5".into())],
            headers: vec![("Authorization".into(), "secret".into())],
            body: Some(json!({"contents": "note"})),
        };

        let text = upstream.send(plan).await.unwrap();
        assert_eq!(text, "{\"id\": \"e1\"}", "response is returned undecoded");
    }

    #[tokio::test]
    async fn test_http_upstream_non_2xx_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
            .mount(&server)
            .await;

        let upstream = HttpUpstream::new().unwrap();
        let plan = RequestPlan {
            method: HttpMethod::Get,
            url: format!("{}/missing", server.uri()),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        };

        let err = upstream.send(plan).await.unwrap_err();
        assert!(matches!(err, InvocationError::UpstreamStatus { status: 404, ref body } if body == "not found"));
    }
}
