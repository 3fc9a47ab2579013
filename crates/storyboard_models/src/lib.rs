//! AI provider integrations for Storyboard.
//!
//! [`GeminiProvider`] implements [`SceneAnalyzer`](storyboard_interface::SceneAnalyzer),
//! [`ImageRenderer`](storyboard_interface::ImageRenderer) and
//! [`PromptRepair`](storyboard_interface::PromptRepair) on top of the Gemini
//! REST API. Construct it once and inject it into the orchestrator.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod gemini;

pub use gemini::{
    Candidate, Content, GEMINI_API_KEY_ENV, GeminiProvider, GenerateContentRequest,
    GenerateContentResponse, GenerationConfig, GenerationConfigBuilder, ImageConfig, InlineData,
    Part, PromptFeedback, extract_image, parse_scenes, response_text, strip_code_fences,
};
