//! Google Gemini provider over the `generateContent` REST endpoint.

mod client;
mod dto;
mod parse;

pub use client::{GEMINI_API_KEY_ENV, GeminiProvider};
pub use dto::{
    Candidate, Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    GenerationConfigBuilder, ImageConfig, InlineData, Part, PromptFeedback,
};
pub use parse::{extract_image, parse_scenes, response_text, strip_code_fences};
