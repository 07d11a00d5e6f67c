//! Shared helpers for integration tests.
//!
//! Builds the full application router through [`build_app_router`] so
//! tests exercise the same middleware stack production uses, with the
//! generation API replaced by a scripted stub.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tokio::sync::Mutex;
use tower::ServiceExt;

use charstudio_api::config::ServerConfig;
use charstudio_api::router::build_app_router;
use charstudio_api::state::AppState;
use charstudio_core::aspect::AspectRatio;
use charstudio_core::data_url;
use charstudio_core::model::{Image, UsageMetadata};
use charstudio_core::types::CharacterId;
use charstudio_genai::{GenAiConfig, GenAiError, GeneratedPayload, ImageGenerator, PromptPart};

/// 1x1 transparent PNG, small enough to inline and real enough to decode.
pub const PIXEL_PNG: &[u8] = &[
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1f,
    0x15, 0xc4, 0x89, 0x00, 0x00, 0x00, 0x0b, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9c, 0x63, 0x60,
    0x00, 0x02, 0x00, 0x00, 0x05, 0x00, 0x01, 0x7a, 0x5e, 0xab, 0x3f, 0x00, 0x00, 0x00, 0x00,
    0x49, 0x45, 0x4e, 0x44, 0xae, 0x42, 0x60, 0x82,
];

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        genai: GenAiConfig::default(),
    }
}

// ---------------------------------------------------------------------------
// Stub generator
// ---------------------------------------------------------------------------

/// Scripted generation stub. Pops pre-seeded outcomes in order; once the
/// script is exhausted every call succeeds with a real 1x1 PNG payload
/// carrying fixed usage metadata (100 prompt / 50 output tokens).
pub struct StubGenerator {
    outcomes: Mutex<VecDeque<Result<GeneratedPayload, GenAiError>>>,
}

impl StubGenerator {
    pub fn new() -> Self {
        Self::scripted(Vec::new())
    }

    pub fn scripted(outcomes: Vec<Result<GeneratedPayload, GenAiError>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
        }
    }

    async fn next(&self) -> Result<GeneratedPayload, GenAiError> {
        self.outcomes
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok(stub_payload()))
    }
}

pub fn stub_payload() -> GeneratedPayload {
    GeneratedPayload {
        data_url: data_url::encode("image/png", PIXEL_PNG),
        usage_metadata: Some(UsageMetadata {
            prompt_token_count: 100,
            candidates_token_count: 50,
            total_token_count: 150,
        }),
    }
}

#[async_trait]
impl ImageGenerator for StubGenerator {
    async fn generate_multimodal(
        &self,
        _parts: &[PromptPart],
    ) -> Result<GeneratedPayload, GenAiError> {
        self.next().await
    }

    async fn generate_from_text(
        &self,
        _prompt: &str,
        _aspect_ratio: AspectRatio,
    ) -> Result<GeneratedPayload, GenAiError> {
        self.next().await
    }
}

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

/// Build the application with an always-succeeding stub generator.
pub fn build_test_app() -> Router {
    build_test_app_scripted(Vec::new()).0
}

/// Build the application with a scripted stub, also returning the state
/// so tests can seed the store directly.
pub fn build_test_app_scripted(
    outcomes: Vec<Result<GeneratedPayload, GenAiError>>,
) -> (Router, AppState) {
    let config = test_config();
    let state = AppState::new(Arc::new(StubGenerator::scripted(outcomes)), config.clone());
    let app = build_app_router(state.clone(), &config);
    (app, state)
}

/// Seed a character with three decodable reference images, enough to
/// pass the generation readiness check.
pub async fn seed_ready_character(state: &AppState, name: &str) -> CharacterId {
    let mut store = state.store.write().await;
    let id = store.add_character(name).unwrap();
    let refs = (0..3)
        .map(|_| Image {
            id: uuid::Uuid::new_v4(),
            data_url: data_url::encode("image/png", PIXEL_PNG),
        })
        .collect();
    store.add_reference_images(id, refs);
    id
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn delete(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// POST a hand-assembled multipart body of image files.
pub async fn post_multipart(app: Router, uri: &str, files: &[(&str, &[u8])]) -> Response {
    const BOUNDARY: &str = "test-boundary-7MA4YWxkTrZu0gW";

    let mut body: Vec<u8> = Vec::new();
    for (filename, bytes) in files {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"files\"; filename=\"{filename}\"\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: image/png\r\n\r\n");
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Collect a response body as raw bytes.
pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

/// Assert the standard error envelope and return its `code`.
pub async fn error_code(response: Response, expected_status: StatusCode) -> String {
    assert_eq!(response.status(), expected_status);
    let json = body_json(response).await;
    assert!(json["error"].is_string(), "error body must carry a message");
    json["code"].as_str().unwrap_or_default().to_string()
}
