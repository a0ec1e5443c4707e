//! Mock providers and request helpers shared by the integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use panelcraft_core::providers::{
    ChatRequest, ImageProvider, ImageRequest, ProviderError, TextModel,
};
use panelcraft_core::GenerationSettings;
use panelcraft_server::{router, AppState};

/// Answers every completion with the same text.
pub struct FixedText(pub &'static str);

#[async_trait]
impl TextModel for FixedText {
    async fn complete(&self, _request: ChatRequest) -> Result<String, ProviderError> {
        Ok(self.0.to_string())
    }
}

/// Every completion fails with a 503 from the provider.
pub struct DownText;

#[async_trait]
impl TextModel for DownText {
    async fn complete(&self, _request: ChatRequest) -> Result<String, ProviderError> {
        Err(ProviderError::Api {
            provider: "OpenAI",
            status: 503,
            body: "upstream overloaded".to_string(),
        })
    }
}

/// Returns `https://img.test/<backend>/<n>.png`.
#[derive(Default)]
pub struct CountingImages {
    calls: AtomicUsize,
}

#[async_trait]
impl ImageProvider for CountingImages {
    async fn generate(&self, request: ImageRequest) -> Result<String, ProviderError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!(
            "https://img.test/{}/{}.png",
            request.backend.display_name(),
            n
        ))
    }
}

/// State with every provider mocked.
pub fn full_state(text: Arc<dyn TextModel>) -> AppState {
    AppState::with_providers(
        Some(text),
        Some(Arc::new(CountingImages::default())),
        Some(Arc::new(CountingImages::default())),
        GenerationSettings::default(),
    )
}

/// State with OpenAI mocked and no Replicate token.
pub fn openai_only_state(text: Arc<dyn TextModel>) -> AppState {
    AppState::with_providers(
        Some(text),
        Some(Arc::new(CountingImages::default())),
        None,
        GenerationSettings::default(),
    )
}

pub fn unconfigured_state() -> AppState {
    AppState::with_providers(None, None, None, GenerationSettings::default())
}

pub fn app(state: AppState) -> Router {
    router(state)
}

pub fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Send one request and return status, content type and the raw body.
pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, String, String) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, content_type, String::from_utf8(bytes.to_vec()).unwrap())
}

pub async fn send_json(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let (status, _, body) = send(app, request).await;
    (status, serde_json::from_str(&body).unwrap())
}

/// Event names, in order, from a text/event-stream body.
pub fn event_names(body: &str) -> Vec<String> {
    body.lines()
        .filter_map(|line| line.strip_prefix("event:"))
        .map(|name| name.trim().to_string())
        .collect()
}

/// JSON payloads, in order, from a text/event-stream body.
pub fn event_payloads(body: &str) -> Vec<serde_json::Value> {
    body.lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|data| serde_json::from_str(data.trim()).unwrap())
        .collect()
}
