//! Shared test helpers for integration tests.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use guardpost_api::{AppState, build_app};
use guardpost_core::config::AppConfig;
use guardpost_database::MemoryDatabase;

const TEST_CONFIG: &str = r#"
[database]
url = "postgres://unused/guardpost"

[auth]
access_token_secret = "test-access-secret"
refresh_token_secret = "test-refresh-secret"
password_hash_cost = 1
password_hash_memory_kib = 1024
expose_reset_token = true
"#;

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Backing store, for direct manipulation
    pub db: MemoryDatabase,
}

/// Tokens and id returned by register/login
#[derive(Debug, Clone)]
pub struct Credentials {
    pub user_id: String,
    pub access_token: String,
    pub refresh_token: String,
}

impl TestApp {
    /// Create a new test application
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Create a test application after adjusting the config
    pub fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let mut config = AppConfig::from_toml(TEST_CONFIG).expect("Failed to load test config");
        adjust(&mut config);

        let db = MemoryDatabase::new();
        let state = AppState::new(
            config,
            Arc::new(db.users()),
            Arc::new(db.sessions()),
            Arc::new(db.permissions()),
            None,
        )
        .expect("Failed to build app state");

        Self {
            router: build_app(state),
            db,
        }
    }

    /// Register a user over HTTP and return their credentials
    pub async fn register(&self, email: &str, password: &str, role: &str) -> Credentials {
        let response = self
            .request(
                "POST",
                "/api/auth/register",
                Some(json!({
                    "name": "Test User",
                    "email": email,
                    "password": password,
                    "role": role,
                })),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        Credentials::from_body(&response.body)
    }

    /// Log in over HTTP and return credentials
    pub async fn login(&self, email: &str, password: &str) -> Credentials {
        let response = self
            .request(
                "POST",
                "/api/auth/login",
                Some(json!({ "email": email, "password": password })),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.body);
        Credentials::from_body(&response.body)
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json")
            .header("User-Agent", "integration-test");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

impl Credentials {
    fn from_body(body: &Value) -> Self {
        let data = &body["data"];
        Self {
            user_id: data["user"]["id"].as_str().expect("user id").to_string(),
            access_token: data["accessToken"].as_str().expect("accessToken").to_string(),
            refresh_token: data["refreshToken"]
                .as_str()
                .expect("refreshToken")
                .to_string(),
        }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// The `message` field of the body
    pub fn message(&self) -> &str {
        self.body["message"].as_str().unwrap_or_default()
    }
}
