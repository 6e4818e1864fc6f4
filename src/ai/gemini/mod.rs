pub mod client;
pub mod ocr;
pub mod types;

pub use client::GeminiHttpClient;
pub use ocr::{GeminiOcrClient, EXTRACTION_PROMPT};
