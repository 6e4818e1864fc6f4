//! Runtime configuration read from the environment.

use crate::{Error, Result};
use std::fmt;
use std::path::PathBuf;

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

#[derive(Clone)]
pub struct Config {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub bind_addr: String,
}

// Keeps the key out of logs and panic messages.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("bind_addr", &self.bind_addr)
            .finish()
    }
}

/// A missing `.env` is fine; an unreadable or malformed one is not.
fn apply_dotenv(result: dotenvy::Result<PathBuf>) -> Result<()> {
    match result {
        Ok(path) => {
            tracing::debug!("Loaded environment from {}", path.display());
            Ok(())
        }
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(e.into()),
    }
}

impl Config {
    /// Load configuration from process environment, after applying `.env`.
    pub fn from_env() -> Result<Self> {
        apply_dotenv(dotenvy::dotenv())?;
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("GEMINI_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| Error::Config("GEMINI_API_KEY not set".to_string()))?;

        let model = lookup("GEMINI_MODEL")
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let model = model.strip_prefix("models/").unwrap_or(&model).to_string();

        let base_url = lookup("GEMINI_BASE_URL")
            .filter(|u| !u.trim().is_empty())
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let bind_addr = lookup("OCR_BIND_ADDR")
            .filter(|a| !a.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        Ok(Self {
            api_key,
            model,
            base_url,
            bind_addr,
        })
    }
}
