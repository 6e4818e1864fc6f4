//! Upload and health handlers.

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::{info, warn};

use super::AppState;
use crate::ai::mime::is_image_mime;

/// Body returned when extraction yields nothing.
pub const NO_TEXT_MESSAGE: &str = "No text found in the image.";

/// Multipart field carrying the image.
const FILE_FIELD: &str = "file";

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Multipart(MultipartError),
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::Multipart(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => {
                warn!("Rejected upload: {}", msg);
                (StatusCode::BAD_REQUEST, msg).into_response()
            }
            ApiError::Multipart(err) => {
                warn!("Rejected upload: {}", err.body_text());
                (err.status(), err.body_text()).into_response()
            }
        }
    }
}

struct Upload {
    data: Vec<u8>,
    content_type: Option<String>,
}

async fn read_upload(multipart: &mut Multipart) -> Result<Option<Upload>, ApiError> {
    let mut upload = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await?.to_vec();
        upload = Some(Upload { data, content_type });
    }

    Ok(upload)
}

/// Extract text from an uploaded image.
///
/// # Multipart Fields
/// - `file`: image file with an `image/*` content type (required)
///
/// # Returns
/// - 200 `text/plain` with the extracted text, or [`NO_TEXT_MESSAGE`]
/// - 400 if the file is missing, empty, or not an image
pub async fn extract_text(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<String, ApiError> {
    let upload = read_upload(&mut multipart)
        .await?
        .ok_or_else(|| ApiError::BadRequest("Missing file in multipart form".to_string()))?;

    if upload.data.is_empty() {
        return Err(ApiError::BadRequest("Uploaded file is empty".to_string()));
    }

    let content_type = upload
        .content_type
        .filter(|ct| is_image_mime(ct))
        .ok_or_else(|| ApiError::BadRequest("Uploaded file must be an image".to_string()))?;

    info!(
        "Received {} byte upload ({})",
        upload.data.len(),
        content_type
    );

    let text = state
        .extractor
        .extract_text(&upload.data, &content_type)
        .await;

    if text.is_empty() {
        Ok(NO_TEXT_MESSAGE.to_string())
    } else {
        Ok(text)
    }
}

pub async fn health() -> &'static str {
    "ok"
}
