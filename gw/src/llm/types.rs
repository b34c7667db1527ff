//! Provider request/response types
//!
//! These model the Gemini `generateContent` API: a request is a list of
//! parts (text and inline images) and a response carries text and/or
//! inline image data.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// A single generation request - everything needed for one provider call
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    /// Model identifier (e.g. "gemini-2.5-flash")
    pub model: String,

    /// Ordered content parts sent as one user turn
    pub parts: Vec<Part>,

    /// Ask the provider to answer with this MIME type (e.g. "application/json")
    pub response_mime_type: Option<String>,

    /// Output size for image models ("1K", "2K", "4K")
    pub image_size: Option<String>,
}

impl GenerateRequest {
    /// Create a request for the given model with no parts
    pub fn new(model: impl Into<String>) -> Self {
        let model = model.into();
        debug!(%model, "GenerateRequest::new: called");
        Self {
            model,
            parts: Vec::new(),
            response_mime_type: None,
            image_size: None,
        }
    }

    /// Append a part
    pub fn part(mut self, part: Part) -> Self {
        self.parts.push(part);
        self
    }

    /// Append a text part
    pub fn text(self, text: impl Into<String>) -> Self {
        self.part(Part::text(text))
    }

    /// Request a JSON answer
    pub fn json_response(mut self) -> Self {
        self.response_mime_type = Some("application/json".to_string());
        self
    }

    /// Request an image of the given size
    pub fn image_size(mut self, size: impl Into<String>) -> Self {
        self.image_size = Some(size.into());
        self
    }

    /// Text of every text part, joined with newlines (used by tests and logs)
    pub fn prompt_text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| match p {
                Part::Text { text } => Some(text.as_str()),
                Part::InlineData { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Number of inline image parts
    pub fn image_count(&self) -> usize {
        self.parts.iter().filter(|p| matches!(p, Part::InlineData { .. })).count()
    }
}

/// A content part
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineImage,
    },
}

impl Part {
    /// Create a text part
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text { text: text.into() }
    }

    /// Create an inline image part from a MIME type and base64 payload
    pub fn inline(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Part::InlineData {
            inline_data: InlineImage {
                mime_type: mime_type.into(),
                data: data.into(),
            },
        }
    }
}

/// Inline binary data, base64-encoded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineImage {
    pub mime_type: String,
    pub data: String,
}

/// Response from a generation request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateResponse {
    /// Concatenated text parts of the first candidate (if any)
    pub text: Option<String>,

    /// Inline image parts of the first candidate
    pub images: Vec<InlineImage>,

    /// Why the model stopped, as reported by the provider
    pub finish_reason: Option<String>,

    /// Token usage for the call
    pub usage: TokenUsage,
}

impl GenerateResponse {
    /// Response carrying only text (mock responses, tests)
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    /// Response carrying a single image (mock responses, tests)
    pub fn from_image(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            images: vec![InlineImage {
                mime_type: mime_type.into(),
                data: data.into(),
            }],
            ..Default::default()
        }
    }
}

/// Token usage for a call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub output_tokens: u64,
}
