//! Test harness: the full router wired to a scripted provider, no database.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderName, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use server_core::domains::scraping::{DriverOptions, RequestDefaults, RunMode};
use server_core::kernel::{
    BaseScrapeProvider, BaseSnapshotStore, MockScrapeProvider, ServerDeps,
};
use server_core::server::auth::{AdminCredentials, SessionStore};
use server_core::server::{build_app, AppState};
use test_context::AsyncTestContext;
use tower::ServiceExt;

pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASS: &str = "1234";

pub struct TestHarness {
    /// `None` when a real provider adapter is plugged in
    mock: Option<Arc<MockScrapeProvider>>,
    pub app: Router,
}

/// The parts of a response the tests look at
pub struct TestResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub disposition: Option<String>,
    pub set_cookie: Option<String>,
    pub body: String,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or(Value::Null)
    }
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        Self::new(MockScrapeProvider::new())
    }

    async fn teardown(self) {
        // Router and in-memory state are dropped
    }
}

impl TestHarness {
    /// Sync-mode driver, no store, a default provider token configured
    pub fn new(provider: MockScrapeProvider) -> Self {
        Self::with_mock(provider, RunMode::Sync, None)
    }

    pub fn with_mode(provider: MockScrapeProvider, mode: RunMode) -> Self {
        Self::with_mock(provider, mode, None)
    }

    pub fn with_store(provider: MockScrapeProvider, store: Arc<dyn BaseSnapshotStore>) -> Self {
        Self::with_mock(provider, RunMode::Sync, Some(store))
    }

    /// Sync-mode driver talking to a real provider adapter
    pub fn with_provider(provider: Arc<dyn BaseScrapeProvider>) -> Self {
        Self {
            mock: None,
            app: Self::router(provider, RunMode::Sync, None),
        }
    }

    /// The scripted provider behind this harness
    pub fn provider(&self) -> &MockScrapeProvider {
        self.mock
            .as_deref()
            .expect("harness was built with a real provider")
    }

    fn with_mock(
        provider: MockScrapeProvider,
        mode: RunMode,
        store: Option<Arc<dyn BaseSnapshotStore>>,
    ) -> Self {
        let mock = Arc::new(provider);
        Self {
            app: Self::router(mock.clone(), mode, store),
            mock: Some(mock),
        }
    }

    fn router(
        provider: Arc<dyn BaseScrapeProvider>,
        mode: RunMode,
        store: Option<Arc<dyn BaseSnapshotStore>>,
    ) -> Router {
        let deps = ServerDeps::new(
            provider,
            DriverOptions {
                actor_id: "apify~facebook-comments-scraper".to_string(),
                mode,
                poll_interval: Duration::from_secs(3),
                poll_deadline: Some(Duration::from_secs(60)),
            },
            store,
            RequestDefaults {
                credential_token: "default-token".to_string(),
            },
        );
        let state = AppState::new(
            deps,
            SessionStore::new(24),
            AdminCredentials {
                username: ADMIN_USER.to_string(),
                password: ADMIN_PASS.to_string(),
            },
        );

        build_app(state)
    }

    /// Send one request through the router
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let header_text = |name: HeaderName| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let status = response.status();
        let content_type = header_text(header::CONTENT_TYPE);
        let disposition = header_text(header::CONTENT_DISPOSITION);
        let set_cookie = header_text(header::SET_COOKIE);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        TestResponse {
            status,
            content_type,
            disposition,
            set_cookie,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }

    /// Log in as the admin and return the session token
    pub async fn login(&self) -> String {
        let response = self
            .send(
                Method::POST,
                "/api/login",
                None,
                Some(json!({ "username": ADMIN_USER, "password": ADMIN_PASS })),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "login failed: {}", response.body);
        response.json()["token"]
            .as_str()
            .expect("login response carries a token")
            .to_string()
    }
}
