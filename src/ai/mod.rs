//! AI service integration for image text extraction
//!
//! Wraps Gemini's multimodal `generateContent` API behind a small trait so the
//! HTTP surface and CLI can swap in mocks.

pub mod gemini;
pub mod mime;
pub mod mock;

pub use gemini::{GeminiOcrClient, EXTRACTION_PROMPT};
pub use mock::MockTextExtractor;

use async_trait::async_trait;

#[async_trait]
pub trait TextExtractionService: Send + Sync {
    /// Returns the text found in the image, or an empty string.
    ///
    /// Never fails: bad input, transport errors and unreadable responses are
    /// logged and collapse to `""`.
    async fn extract_text(&self, image_bytes: &[u8], mime_type: &str) -> String;
}
