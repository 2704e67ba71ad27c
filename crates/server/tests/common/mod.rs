//! Common test utilities for API testing.
//!
//! This module provides a test fixture that drives the router in-process,
//! without binding a socket.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use brush_core::{ClientConfig, Config, SiteConfig};

/// Re-export fixtures for test convenience
#[allow(unused_imports)]
pub use brush_core::testing::fixtures;

/// Test fixture for API testing.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_decide() {
///     let fixture = TestFixture::new();
///
///     let response = fixture.post("/api/v1/decide", json!({
///         "site": "alpha",
///         "status": { "free_space_on_disk": -1, "upload_speed": 0 }
///     })).await;
///
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    /// Raw body, for non-JSON responses.
    pub text: String,
}

impl TestFixture {
    /// Create a fixture with sites "alpha" (defaults) and "beta" (allows
    /// non-free torrents, excludes samples).
    pub fn new() -> Self {
        let mut beta = SiteConfig::named("beta");
        beta.allow_none_free = true;
        beta.excludes = vec!["sample".to_string()];

        Self::with_config(Config {
            client: ClientConfig::default(),
            sites: vec![SiteConfig::named("alpha"), beta],
            ..Default::default()
        })
    }

    /// Create a fixture with a custom configuration.
    pub fn with_config(config: Config) -> Self {
        let state = Arc::new(brush_server::state::AppState::new(config));
        let router = brush_server::api::create_router(state);
        Self { router }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        let body = serde_json::to_string(&body).unwrap();
        self.request("POST", path, Some(body)).await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        self.request("POST", path, Some(body.to_string())).await
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<String>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(body)
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let text = String::from_utf8_lossy(&body_bytes).to_string();
        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body, text }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status, $response.status, $response.text
        );
    };
}
