//! HTTP transport for MCP

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::error::Result;
use crate::protocol::{McpMessage, RequestHandler};

/// HTTP transport for MCP protocol
pub struct HttpTransport {
    handler: Arc<RequestHandler>,
    addr: SocketAddr,
}

impl HttpTransport {
    pub fn new(handler: Arc<RequestHandler>, addr: SocketAddr) -> Self {
        Self { handler, addr }
    }

    /// Routes served by the transport
    pub fn router(handler: Arc<RequestHandler>) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        Router::new()
            .route("/", get(health))
            .route("/health", get(health))
            .route("/mcp", post(handle_mcp_request))
            .layer(TraceLayer::new_for_http())
            .layer(cors)
            .with_state(handler)
    }

    /// Run the HTTP server
    pub async fn run(&self) -> Result<()> {
        let app = Self::router(self.handler.clone());

        info!("Starting MCP HTTP server on {}", self.addr);
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}

/// Health check endpoint
async fn health() -> &'static str {
    "OK"
}

/// Handle one MCP JSON-RPC message via HTTP POST
async fn handle_mcp_request(
    State(handler): State<Arc<RequestHandler>>,
    Json(message): Json<McpMessage>,
) -> Response {
    debug!("HTTP request: {:?}", message.method);

    match handler.handle(message).await {
        Some(response) => Json(response).into_response(),
        // notifications have no response body
        None => StatusCode::ACCEPTED.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::handler::tests::test_handler;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn post_json(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/mcp")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let docs = TempDir::new().unwrap();
        let app = HttpTransport::router(Arc::new(test_handler(&docs)));

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_post_request() {
        let docs = TempDir::new().unwrap();
        let app = HttpTransport::router(Arc::new(test_handler(&docs)));

        let response = app
            .oneshot(post_json(json!({
                "jsonrpc": "2.0",
                "id": 3,
                "method": "tools/call",
                "params": {"name": "xsoar_list_items", "arguments": {}}
            })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["id"], 3);
        assert_eq!(body["result"]["content"][0]["text"], "GET https://xsoar.example.com/items");
    }

    #[tokio::test]
    async fn test_post_notification() {
        let docs = TempDir::new().unwrap();
        let app = HttpTransport::router(Arc::new(test_handler(&docs)));

        let response = app
            .oneshot(post_json(json!({"jsonrpc": "2.0", "method": "notifications/initialized"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }
}
