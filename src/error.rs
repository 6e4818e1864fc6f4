//! Error handling and custom error types
//!
//! Provides unified error handling across the crate using thiserror. The
//! extraction adapter never returns these to its callers; it classifies them
//! with [`Error::kind`] and logs instead.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("HTTP request error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Gemini API error (status {status}): {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Failed to decode Gemini response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] dotenvy::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse failure classes used to pick the log message for a failed call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Input,
    Transport,
    Decode,
    /// Failures outside a single extraction call, such as startup config.
    Unexpected,
}

impl Error {
    pub fn kind(&self) -> FailureKind {
        match self {
            Error::InvalidInput(_) => FailureKind::Input,
            Error::Transport(e) if e.is_decode() => FailureKind::Decode,
            Error::Transport(_) | Error::Status { .. } => FailureKind::Transport,
            Error::Decode(_) => FailureKind::Decode,
            Error::Config(_) | Error::EnvVar(_) | Error::Io(_) => FailureKind::Unexpected,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
