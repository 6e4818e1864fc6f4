//! Router configuration for the web server.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use super::handlers;
use super::AppState;

/// Largest accepted request body.
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/ocr", post(handlers::extract_text))
        .route("/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        // Panics below this layer become 500 responses
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
