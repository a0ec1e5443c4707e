//! # API Errors
//!
//! Maps pipeline errors onto `{ "error": string }` responses. Validation
//! problems are 400; everything else is 500. Generation failures carry a
//! generic, endpoint-specific message while the cause goes to the log.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use panelcraft_core::GenerationError;

use super::types::ErrorBody;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Missing or malformed input.
    #[error("{0}")]
    BadRequest(String),

    /// A provider credential is not configured.
    #[error("{0}")]
    Configuration(String),

    /// The pipeline failed after it started calling providers.
    #[error("{message}: {source}")]
    Generation {
        message: &'static str,
        #[source]
        source: GenerationError,
    },
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Map a pipeline error, hiding unrecovered failures behind `message`.
    pub fn failed(message: &'static str) -> impl FnOnce(GenerationError) -> AppError {
        move |error| match error {
            GenerationError::Validation(msg) => AppError::BadRequest(msg),
            GenerationError::Configuration(msg) => AppError::Configuration(msg),
            source => AppError::Generation { message, source },
        }
    }
}

impl From<GenerationError> for AppError {
    fn from(error: GenerationError) -> Self {
        AppError::failed("Request failed")(error)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Configuration(msg) => {
                tracing::error!(error = %msg, "provider not configured");
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
            AppError::Generation { message, source } => {
                tracing::error!(error = %source, "{}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, message.to_string())
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
