//! Router-level tests: requests go through `oneshot` against mocked providers.

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};

use common::*;

/// Not JSON, so every stage falls back to its deterministic output.
const CHATTY: &str = "Sure, here is something that is not JSON.";

#[tokio::test]
async fn health_reports_configured_providers() {
    let (status, json) = send_json(app(openai_only_state(Arc::new(FixedText(CHATTY)))), get("/api/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["openaiConfigured"], true);
    assert_eq!(json["replicateConfigured"], false);
}

#[tokio::test]
async fn openapi_document_lists_endpoints() {
    let (status, content_type, body) = send(app(unconfigured_state()), get("/api/openapi.json")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type, "application/json");
    let doc: serde_json::Value = serde_json::from_str(&body).unwrap();
    for path in [
        "/api/generate-comic",
        "/api/generate-comic-stream",
        "/api/generate-meme",
        "/api/health",
    ] {
        assert!(doc["paths"].get(path).is_some(), "missing {path}");
    }
}

#[tokio::test]
async fn batch_comic_returns_every_panel() {
    let state = openai_only_state(Arc::new(FixedText(CHATTY)));
    let request = post_json(
        "/api/generate-comic",
        r#"{"prompt": "a cat trying to cook", "gridSize": "2x3"}"#,
    );

    let (status, json) = send_json(app(state), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["gridLayout"], "2x3");
    let panels = json["panels"].as_array().unwrap();
    assert_eq!(panels.len(), 6);
    assert!(panels[0]["url"].as_str().unwrap().starts_with("https://img.test/"));
    assert!(panels[0]["description"].as_str().unwrap().starts_with("Panel 1"));
}

#[tokio::test]
async fn missing_prompt_is_a_bad_request_even_without_credentials() {
    let (status, json) = send_json(
        app(unconfigured_state()),
        post_json("/api/generate-comic", r#"{"gridSize": "2x2"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Prompt is required");
}

#[tokio::test]
async fn malformed_grid_is_a_bad_request() {
    let state = openai_only_state(Arc::new(FixedText(CHATTY)));
    let (status, json) = send_json(
        app(state),
        post_json("/api/generate-comic", r#"{"prompt": "a cat", "gridSize": "0x2"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("0x2"));
}

#[tokio::test]
async fn oversized_grid_is_a_bad_request() {
    for grid in ["5x5", "4294967296x4294967296"] {
        let body = format!(r#"{{"prompt": "a cat", "gridSize": "{grid}"}}"#);
        let state = full_state(Arc::new(FixedText(CHATTY)));
        let (status, json) =
            send_json(app(state), post_json("/api/generate-comic-stream", &body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "grid {grid}");
        assert!(json["error"].as_str().unwrap().contains("at most 16 panels"));
    }
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let (status, json) = send_json(
        app(unconfigured_state()),
        post_json("/api/generate-comic", "{not json"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn missing_openai_key_is_a_configuration_error() {
    let (status, json) = send_json(
        app(unconfigured_state()),
        post_json("/api/generate-comic", r#"{"prompt": "a cat"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "OpenAI API key not configured");
}

#[tokio::test]
async fn text_provider_outage_returns_generic_comic_error() {
    let state = openai_only_state(Arc::new(DownText));
    let (status, json) = send_json(
        app(state),
        post_json("/api/generate-comic", r#"{"prompt": "a cat"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Failed to generate comic");
}

#[tokio::test]
async fn stream_requires_replicate_token() {
    let state = openai_only_state(Arc::new(FixedText(CHATTY)));
    let (status, json) = send_json(
        app(state),
        post_json("/api/generate-comic-stream", r#"{"prompt": "a cat"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Replicate API token not configured");
}

#[tokio::test]
async fn stream_emits_full_event_protocol() {
    let state = full_state(Arc::new(FixedText(CHATTY)));
    let request = post_json(
        "/api/generate-comic-stream",
        r#"{"prompt": "a cat trying to cook", "gridSize": "1x2"}"#,
    );

    let (status, content_type, body) = send(app(state), request).await;

    assert_eq!(status, StatusCode::OK);
    assert!(content_type.starts_with("text/event-stream"));

    let names = event_names(&body);
    assert_eq!(names.first().map(String::as_str), Some("start"));
    assert_eq!(names.last().map(String::as_str), Some("complete"));
    assert_eq!(names.iter().filter(|n| *n == "panel-complete").count(), 2);
    assert!(!names.iter().any(|n| n == "error"));

    let payloads = event_payloads(&body);
    assert_eq!(payloads[0]["totalPanels"], 2);
    let complete = payloads.last().unwrap();
    assert_eq!(complete["panels"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn stream_reports_failure_as_error_event() {
    let state = full_state(Arc::new(DownText));
    let request = post_json("/api/generate-comic-stream", r#"{"prompt": "a cat"}"#);

    let (status, _, body) = send(app(state), request).await;

    assert_eq!(status, StatusCode::OK);
    let names = event_names(&body);
    assert_eq!(names.first().map(String::as_str), Some("start"));
    assert_eq!(names.last().map(String::as_str), Some("error"));
    assert!(!names.iter().any(|n| n == "complete"));

    let error = event_payloads(&body).pop().unwrap();
    assert_eq!(error["message"], "Failed to generate comic");
    assert!(error["error"].as_str().unwrap().contains("503"));
}

#[tokio::test]
async fn meme_returns_six_uppercase_captions() {
    let state = openai_only_state(Arc::new(FixedText(
        r#"[{"topText": "me at 3am", "bottomText": "one more episode"}]"#,
    )));
    let request = post_json(
        "/api/generate-meme",
        r#"{"imageData": "data:image/png;base64,AAAA", "style": "relatable"}"#,
    );

    let (status, json) = send_json(app(state), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["style"], "relatable");
    assert_eq!(json["message"], "Meme texts generated successfully!");
    let texts = json["memeTexts"].as_array().unwrap();
    assert_eq!(texts.len(), 6);
    assert_eq!(texts[0]["topText"], "ME AT 3AM");
    for text in texts {
        let top = text["topText"].as_str().unwrap();
        assert_eq!(top, top.to_uppercase());
    }
}

#[tokio::test]
async fn meme_requires_image_data() {
    let (status, json) = send_json(
        app(unconfigured_state()),
        post_json("/api/generate-meme", r#"{"style": "funny"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Image data is required");
}

#[tokio::test]
async fn meme_provider_outage_returns_generic_error() {
    let state = openai_only_state(Arc::new(DownText));
    let request = post_json(
        "/api/generate-meme",
        r#"{"imageData": "data:image/png;base64,AAAA"}"#,
    );

    let (status, json) = send_json(app(state), request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Failed to generate meme texts");
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/api/generate-comic-stream")
        .header(header::ORIGIN, "http://localhost:5173")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap();

    let response = tower::ServiceExt::oneshot(app(unconfigured_state()), request)
        .await
        .unwrap();

    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "*"
    );
}
