//! Router-level test client.
//!
//! Drives the full axum app with `oneshot` against the in-memory store, so
//! requests go through extractors, handlers and error mapping exactly as in
//! production.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tontine_core::kernel::TestDependencies;
use tontine_core::server::build_app;
use tower::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub deps: TestDependencies,
}

impl TestApp {
    /// Simulated verification: any six digits sign in.
    pub fn new() -> Self {
        Self::from_deps(TestDependencies::new())
    }

    /// Codes go out through the mock SMS service and must match.
    pub fn with_real_verification() -> Self {
        Self::from_deps(TestDependencies::new().with_real_verification())
    }

    fn from_deps(deps: TestDependencies) -> Self {
        let router = build_app(deps.server_deps(), &[]);
        Self { router, deps }
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, Some(body)).await
    }

    /// Non-JSON bodies (axum rejections) come back as `Value::String`.
    async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, value)
    }

    /// send-code + verify-code; returns the verified session id.
    pub async fn sign_in(&self, phone: &str, country_code: &str) -> String {
        let (status, sent) = self
            .post(
                "/api/auth/send-code",
                json!({"phone": phone, "country_code": country_code}),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "send-code failed: {}", sent);

        let (status, verified) = self
            .post(
                "/api/auth/verify-code",
                json!({"phone": phone, "country_code": country_code, "code": "123456"}),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(verified["success"], true, "verify-code failed: {}", verified);

        verified["session_id"].as_str().unwrap().to_string()
    }

    /// Sign in and create a profile; returns the session id.
    pub async fn register(
        &self,
        phone: &str,
        country_code: &str,
        first_name: &str,
        last_name: &str,
    ) -> String {
        let session_id = self.sign_in(phone, country_code).await;
        let (status, created) = self
            .post(
                &format!("/api/profile/create?session_id={}", session_id),
                json!({"first_name": first_name, "last_name": last_name}),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(created["success"], true, "profile/create failed: {}", created);
        session_id
    }
}
