//! # Panelcraft Server
//!
//! HTTP surface over `panelcraft_core`: JSON endpoints for batch comic and
//! meme generation, and a server-sent-events endpoint that streams comic
//! progress.

pub mod api;
pub mod state;

use axum::{
    http::{header, Method},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use state::AppState;

/// The full application: `/api` routes, permissive CORS and request tracing.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .nest("/api", api::routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
