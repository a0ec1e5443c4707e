//! # Comic API
//!
//! Batch generation returns the finished comic as JSON. Streaming
//! generation runs the pipeline in a background task and relays its
//! events as server-sent events.

use std::convert::Infallible;

use axum::{
    extract::{rejection::JsonRejection, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::stream::Stream;
use tokio_stream::{wrappers::ReceiverStream, StreamExt};

use panelcraft_core::orchestrator::{ChannelSink, ComicEvent};

use super::error::{AppError, AppResult};
use super::types::{ComicRequestBody, ComicResponse, ErrorBody};
use crate::state::{AppState, Requirement};

/// Events buffered between the pipeline and a slow client.
const EVENT_BUFFER: usize = 32;

/// Generate a comic in one request
#[utoipa::path(
    post,
    path = "/api/generate-comic",
    tag = "comic",
    request_body = ComicRequestBody,
    responses(
        (status = 200, description = "Finished comic", body = ComicResponse),
        (status = 400, description = "Missing prompt or malformed grid", body = ErrorBody),
        (status = 500, description = "Provider not configured or generation failed", body = ErrorBody)
    )
)]
pub async fn generate_comic(
    State(state): State<AppState>,
    body: Result<Json<ComicRequestBody>, JsonRejection>,
) -> AppResult<Json<ComicResponse>> {
    let Json(body) = body?;
    let request = body.into_request()?;
    let orchestrator = state.orchestrator(Requirement::OpenAi)?;

    tracing::info!(grid = %request.grid, "generating comic");
    let comic = orchestrator
        .run_batch(&request)
        .await
        .map_err(AppError::failed("Failed to generate comic"))?;

    Ok(Json(comic.into()))
}

/// Generate a comic, streaming progress as server-sent events
///
/// Once the stream has started, failures arrive as `panel-failed` and
/// `error` events rather than HTTP status codes.
#[utoipa::path(
    post,
    path = "/api/generate-comic-stream",
    tag = "comic",
    request_body = ComicRequestBody,
    responses(
        (status = 200, description = "Event stream: start, progress, panel-start, panel-complete, panel-error, panel-failed, complete, error", content_type = "text/event-stream", body = String),
        (status = 400, description = "Missing prompt or malformed grid", body = ErrorBody),
        (status = 500, description = "Provider not configured", body = ErrorBody)
    )
)]
pub async fn generate_comic_stream(
    State(state): State<AppState>,
    body: Result<Json<ComicRequestBody>, JsonRejection>,
) -> AppResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let Json(body) = body?;
    let request = body.into_request()?;
    let orchestrator = state.orchestrator(Requirement::OpenAiAndReplicate)?;

    let (sink, rx) = ChannelSink::new(EVENT_BUFFER);
    tokio::spawn(async move {
        if let Err(e) = orchestrator.run_streaming(&request, &sink).await {
            tracing::warn!(error = %e, "comic stream ended with an error");
        }
    });

    let stream = ReceiverStream::new(rx).map(|event| Ok(to_sse_event(&event)));
    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

fn to_sse_event(event: &ComicEvent) -> Event {
    Event::default()
        .event(event.name())
        .data(event.payload().to_string())
}
