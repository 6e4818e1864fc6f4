//! Gemini `generateContent` payload types for image text extraction.

use serde::{Deserialize, Serialize};

/// Outbound request envelope.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

/// Gemini content container used in requests.
#[derive(Debug, Clone, Serialize)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub parts: Vec<Part>,
}

/// Untagged union of text and inline media content parts.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

/// Base64 inline payload used for image/vision requests.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

impl GenerateContentRequest {
    /// A single content block with the instruction first and the image second.
    pub fn instruction_with_image(instruction: &str, mime_type: &str, base64_data: String) -> Self {
        Self {
            contents: vec![Content {
                role: None,
                parts: vec![
                    Part::Text {
                        text: instruction.to_string(),
                    },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: mime_type.to_string(),
                            data: base64_data,
                        },
                    },
                ],
            }],
        }
    }
}

/// Top-level `generateContent` response envelope.
///
/// Every level is optional: Gemini omits `candidates` when a prompt is
/// blocked, and `content`/`parts` when generation stops early.
#[derive(Debug, Default, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Option<Vec<CandidatePart>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CandidatePart {
    #[serde(default)]
    pub text: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first part of the first candidate, if present and not blank.
    pub fn first_text(&self) -> Option<&str> {
        let candidate = self.candidates.as_ref()?.first()?;
        let part = candidate.content.as_ref()?.parts.as_ref()?.first()?;
        let text = part.text.as_deref()?;
        if text.trim().is_empty() {
            return None;
        }
        Some(text)
    }
}
