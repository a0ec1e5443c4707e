//! # HTTP API
//!
//! Routes under `/api`, plus the OpenAPI document describing them.

pub mod comic;
pub mod error;
pub mod meme;
pub mod types;

use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use utoipa::OpenApi;

use panelcraft_core::models::Provider;

use crate::state::AppState;
use types::{
    ComicRequestBody, ComicResponse, ErrorBody, HealthResponse, MemeRequestBody, MemeResponse,
    MemeTextDto, PanelDto,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Panelcraft API",
        version = "0.1.0",
        description = "Comic and meme generation over hosted text and image models"
    ),
    paths(
        comic::generate_comic,
        comic::generate_comic_stream,
        meme::generate_meme,
        health
    ),
    components(schemas(
        ComicRequestBody,
        ComicResponse,
        PanelDto,
        MemeRequestBody,
        MemeResponse,
        MemeTextDto,
        ErrorBody,
        HealthResponse
    )),
    tags(
        (name = "comic", description = "Comic generation"),
        (name = "meme", description = "Meme captions"),
        (name = "system", description = "Health and metadata")
    )
)]
pub struct ApiDoc;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/generate-comic", post(comic::generate_comic))
        .route("/generate-comic-stream", post(comic::generate_comic_stream))
        .route("/generate-meme", post(meme::generate_meme))
        .route("/health", get(health))
        .route("/openapi.json", get(serve_openapi))
}

/// Liveness and credential status
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "system",
    responses(
        (status = 200, description = "Server is up", body = HealthResponse)
    )
)]
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        openai_configured: state.is_configured(Provider::OpenAI),
        replicate_configured: state.is_configured(Provider::Replicate),
    })
}

async fn serve_openapi() -> Response {
    match ApiDoc::openapi().to_json() {
        Ok(spec) => ([(header::CONTENT_TYPE, "application/json")], Body::from(spec)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to render OpenAPI document");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
