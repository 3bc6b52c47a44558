//! Common test utilities for in-process HTTP testing with mocks.
//!
//! This module provides a test fixture that builds the real router on top
//! of a pipeline wired to the mock extractor and muxer, so the HTTP surface
//! can be exercised without yt-dlp or ffmpeg installed.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use tubemux_core::{
    testing::{fixtures::count_files, MockExtractor, MockMuxer},
    Config, Pipeline, PipelineConfig,
};
use tubemux_server::{api::create_router, state::AppState};

/// Re-export fixtures for test convenience
pub use tubemux_core::testing::fixtures;

/// Boundary used for multipart request bodies.
const MULTIPART_BOUNDARY: &str = "tubemux-test-boundary";

/// Markup served from the fixture's static directory.
pub const INDEX_HTML: &str = "<!doctype html><form action=\"/download\" method=\"post\"></form>";

/// Test fixture with mock dependencies.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_download() {
///     let fixture = TestFixture::new().await;
///
///     let response = fixture
///         .post_json("/download", json!({ "url": fixtures::watch_url() }))
///         .await;
///
///     assert_eq!(response.status, StatusCode::OK);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock extractor - configure metadata and streams
    pub extractor: MockExtractor,
    /// Mock muxer - inject failures and delays
    pub muxer: MockMuxer,
    /// Root for temp, downloads and static directories
    pub temp_dir: TempDir,
}

/// Response from a test request, with the body fully read.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

impl TestFixture {
    /// Create a new test fixture with default mocks and generous deadlines.
    pub async fn new() -> Self {
        Self::with_timeouts(Duration::from_secs(5), Duration::from_secs(5), Duration::from_secs(5))
            .await
    }

    /// Create a test fixture with custom stage deadlines.
    pub async fn with_timeouts(metadata: Duration, download: Duration, mux: Duration) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        let static_dir = temp_dir.path().join("public");
        std::fs::create_dir_all(&static_dir).expect("Failed to create static dir");
        std::fs::write(static_dir.join("index.html"), INDEX_HTML).expect("Failed to write index");

        let mut config = Config::default();
        config.storage = fixtures::storage(temp_dir.path());
        config.server.static_dir = static_dir;

        let extractor = MockExtractor::new();
        let muxer = MockMuxer::new();

        let pipeline_config =
            PipelineConfig::from(&config).with_timeouts(metadata, download, mux);
        let pipeline = Arc::new(Pipeline::new(
            pipeline_config,
            Arc::new(extractor.clone()),
            Arc::new(muxer.clone()),
        ));

        let state = Arc::new(AppState::new(config, pipeline));
        let router = create_router(state);

        Self {
            router,
            extractor,
            muxer,
            temp_dir,
        }
    }

    /// Files left under the temp and downloads roots.
    pub fn leftover_files(&self) -> usize {
        let root = self.temp_dir.path();
        count_files(&root.join("tmp")) + count_files(&root.join("downloads"))
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Send a GET request.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.send("GET", path, None, Body::empty()).await
    }

    /// Send a POST request with JSON body.
    pub async fn post_json(&self, path: &str, body: Value) -> TestResponse {
        let bytes = serde_json::to_vec(&body).expect("Failed to encode JSON");
        self.send("POST", path, Some("application/json"), Body::from(bytes))
            .await
    }

    /// Send a POST request with a URL-encoded form body.
    pub async fn post_form(&self, path: &str, body: &str) -> TestResponse {
        self.send(
            "POST",
            path,
            Some("application/x-www-form-urlencoded"),
            Body::from(body.to_string()),
        )
        .await
    }

    /// Send a POST request with a multipart body holding the given text fields.
    pub async fn post_multipart(&self, path: &str, fields: &[(&str, &str)]) -> TestResponse {
        let mut body = String::new();
        for (name, value) in fields {
            body.push_str(&format!(
                "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            ));
        }
        body.push_str(&format!("--{MULTIPART_BOUNDARY}--\r\n"));

        let content_type = format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}");
        self.send("POST", path, Some(&content_type), Body::from(body))
            .await
    }

    /// Send a POST request with a raw body and custom content type.
    pub async fn post_raw(&self, path: &str, body: &str, content_type: &str) -> TestResponse {
        self.send("POST", path, Some(content_type), Body::from(body.to_string()))
            .await
    }

    async fn send(
        &self,
        method: &str,
        path: &str,
        content_type: Option<&str>,
        body: Body,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(content_type) = content_type {
            builder = builder.header("Content-Type", content_type);
        }
        let request = builder.body(body).expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        TestResponse {
            status,
            headers,
            body,
        }
    }
}
