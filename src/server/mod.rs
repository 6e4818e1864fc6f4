//! HTTP surface for image text extraction.
//!
//! One upload endpoint that forwards the image to a [`TextExtractionService`]
//! and answers with plain text.

mod handlers;
mod routes;

pub use handlers::NO_TEXT_MESSAGE;
pub use routes::{create_router, MAX_UPLOAD_BYTES};

use crate::ai::TextExtractionService;
use crate::Result;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub extractor: Arc<dyn TextExtractionService>,
}

impl AppState {
    pub fn new(extractor: Arc<dyn TextExtractionService>) -> Self {
        Self { extractor }
    }
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(state: AppState, addr: &str) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, create_router(state)).await?;
    Ok(())
}
