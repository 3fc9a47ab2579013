//! Gemini `generateContent` request and response bodies.
//!
//! Only the fields the pipeline reads or writes are modelled; unknown fields
//! in responses are ignored.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Request body for `models/{model}:generateContent`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    /// Conversation turns (always a single user turn here)
    pub contents: Vec<Content>,
    /// Instructions applied to the whole request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    /// Output controls
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

impl GenerateContentRequest {
    /// Single user turn carrying `text`.
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            contents: vec![Content::user(text)],
            ..Self::default()
        }
    }

    /// Attach a system instruction.
    pub fn with_system(mut self, text: impl Into<String>) -> Self {
        self.system_instruction = Some(Content {
            role: None,
            parts: vec![Part::text(text)],
        });
        self
    }

    /// Attach output controls.
    pub fn with_config(mut self, config: GenerationConfig) -> Self {
        self.generation_config = Some(config);
        self
    }
}

/// One turn of content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    /// `user` or `model`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Text and inline media parts
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    /// User turn with a single text part.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![Part::text(text)],
        }
    }
}

/// Text or inline binary part.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    /// Text content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Base64 media content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

impl Part {
    /// Text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }
}

/// Base64 encoded media.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    /// MIME type of the payload
    pub mime_type: String,
    /// Base64 payload
    pub data: String,
}

/// Output controls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Builder)]
#[serde(rename_all = "camelCase")]
#[builder(default, setter(into, strip_option))]
pub struct GenerationConfig {
    /// Force a MIME type for text output (`application/json`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    /// Requested output modalities (`TEXT`, `IMAGE`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_modalities: Option<Vec<String>>,
    /// Image output controls
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_config: Option<ImageConfig>,
    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl GenerationConfig {
    /// Creates a new builder for `GenerationConfig`.
    pub fn builder() -> GenerationConfigBuilder {
        GenerationConfigBuilder::default()
    }
}

/// Image output controls.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageConfig {
    /// Aspect ratio such as `16:9`
    pub aspect_ratio: String,
}

/// Response body of `generateContent`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    /// Generated candidates, empty when the prompt was blocked
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    /// Present when the prompt itself was rejected
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

/// One generated candidate.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Candidate content; absent when generation was stopped by a filter
    #[serde(default)]
    pub content: Option<Content>,
    /// `STOP`, `SAFETY`, `IMAGE_SAFETY`, ...
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Prompt-level feedback.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    /// Why the prompt was blocked
    #[serde(default)]
    pub block_reason: Option<String>,
}
