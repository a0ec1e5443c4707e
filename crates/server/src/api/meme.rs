//! # Meme API

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use super::error::{AppError, AppResult};
use super::types::{ErrorBody, MemeRequestBody, MemeResponse};
use crate::state::{AppState, Requirement};

/// Caption an uploaded image
///
/// Always returns six top/bottom caption pairs, upper-cased.
#[utoipa::path(
    post,
    path = "/api/generate-meme",
    tag = "meme",
    request_body = MemeRequestBody,
    responses(
        (status = 200, description = "Six caption pairs", body = MemeResponse),
        (status = 400, description = "Missing image data", body = ErrorBody),
        (status = 500, description = "Provider not configured or generation failed", body = ErrorBody)
    )
)]
pub async fn generate_meme(
    State(state): State<AppState>,
    body: Result<Json<MemeRequestBody>, JsonRejection>,
) -> AppResult<Json<MemeResponse>> {
    let Json(body) = body?;
    let request = body.into_request()?;
    let orchestrator = state.orchestrator(Requirement::OpenAi)?;

    let variants = orchestrator
        .generate_memes(&request)
        .await
        .map_err(AppError::failed("Failed to generate meme texts"))?;

    Ok(Json(MemeResponse::new(variants, request.style)))
}
