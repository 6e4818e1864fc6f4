//! Image text extraction backed by Gemini.
//!
//! Accepts raw image bytes plus a MIME type, asks Gemini's multimodal
//! `generateContent` endpoint to transcribe them, and hands back plain text.
//! Every failure collapses to an empty string and a log line.

pub mod ai;
pub mod config;
pub mod error;
pub mod server;

#[cfg(test)]
mod test_support;

pub use config::Config;
pub use error::{Error, FailureKind, Result};
