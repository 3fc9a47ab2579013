//! Gemini REST client implementing the three collaborator traits.

use crate::gemini::dto::{
    GenerateContentRequest, GenerateContentResponse, GenerationConfig, ImageConfig,
};
use crate::gemini::parse::{extract_image, parse_scenes, response_text};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use storyboard_core::{AspectRatio, ImageData, SceneDescriptor};
use storyboard_error::{
    AnalysisError, AnalysisErrorKind, ConfigError, HttpError, ProviderError, ProviderErrorKind,
    RenderError, RenderErrorKind, RepairError, StoryboardResult,
};
use storyboard_interface::{ImageRenderer, PromptRepair, SceneAnalyzer};
use storyboard_rate_limit::{ProviderConfig, RateLimiter};
use tracing::{debug, info, instrument, warn};

/// Environment variable holding the Gemini API key.
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

const ANALYSIS_INSTRUCTION: &str = "You split stories into illustrated scenes. \
Reply with a JSON array only. Each element is an object with the fields \
\"index\" (1-based scene number in story order), \"summary\" (one sentence) and \
\"imagePrompt\" (a detailed visual description of the scene for an illustrator). \
Keep characters and settings visually consistent between scenes.";

const REPAIR_INSTRUCTION: &str = "An image generator refused the following prompt. \
Rewrite it so that it is unlikely to be blocked by content safety filters while \
keeping the same scene, characters and mood. Reply with the rewritten prompt only.";

/// Gemini provider: scene analysis, image rendering and prompt repair.
///
/// All requests share one [`RateLimiter`], so analysis, renders and repairs
/// of a batch and any concurrent retries draw from the same quota.
///
/// # Example
///
/// ```rust,no_run
/// use storyboard_models::GeminiProvider;
/// use storyboard_rate_limit::StoryboardConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = StoryboardConfig::load()?;
/// let provider = GeminiProvider::from_env(&config.provider)?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    config: ProviderConfig,
    limiter: RateLimiter,
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("base_url", &self.config.base_url)
            .field("text_model", &self.config.text_model)
            .field("image_model", &self.config.image_model)
            .field("limiter", &self.limiter)
            .finish_non_exhaustive()
    }
}

impl GeminiProvider {
    /// Create a provider with an explicit API key.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the key is blank, or an [`HttpError`] if
    /// the HTTP client cannot be initialized.
    #[instrument(skip(api_key, config), fields(text_model = %config.text_model, image_model = %config.image_model))]
    pub fn new(api_key: impl Into<String>, config: &ProviderConfig) -> StoryboardResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ConfigError::new(format!(
                "Gemini API key is empty; set {} or pass --api-key",
                GEMINI_API_KEY_ENV
            ))
            .into());
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| HttpError::new(format!("Failed to build HTTP client: {}", e)))?;

        info!(rpm = ?config.rpm, max_concurrent = ?config.max_concurrent, "Created Gemini provider");

        Ok(Self {
            client,
            api_key,
            config: config.clone(),
            limiter: RateLimiter::from_config(config),
        })
    }

    /// Create a provider with the key from `GEMINI_API_KEY`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the variable is unset or blank.
    pub fn from_env(config: &ProviderConfig) -> StoryboardResult<Self> {
        let api_key = std::env::var(GEMINI_API_KEY_ENV).map_err(|e| {
            ConfigError::new(format!("{} not set: {}", GEMINI_API_KEY_ENV, e))
        })?;
        Self::new(api_key, config)
    }

    /// Provider settings in use.
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Call `generateContent` under rate limiting and retry.
    async fn generate(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, ProviderError> {
        self.limiter
            .execute(|| self.send(model, request))
            .await
    }

    async fn send(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, ProviderError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            model
        );
        debug!(url = %url, "Sending Gemini request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| ProviderError::new(ProviderErrorKind::Transport(e.to_string())))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::new(ProviderErrorKind::HttpStatus {
                status_code: status.as_u16(),
                message,
            }));
        }

        response.json().await.map_err(|e| {
            ProviderError::new(ProviderErrorKind::InvalidResponse(format!(
                "Failed to parse response: {}",
                e
            )))
        })
    }

    fn styled_prompt(&self, prompt: &str) -> String {
        let style = self.config.house_style.trim();
        if style.is_empty() {
            prompt.to_string()
        } else {
            format!("{}\n\n{}", style, prompt)
        }
    }

    async fn try_repair(&self, prompt: &str) -> Result<String, RepairError> {
        let config = Self::text_config(false).map_err(|e| RepairError::new(e.to_string()))?;
        let request = GenerateContentRequest::user_text(prompt)
            .with_system(REPAIR_INSTRUCTION)
            .with_config(config);

        let response = self
            .generate(&self.config.text_model, &request)
            .await
            .map_err(|e| RepairError::new(e.kind.to_string()))?;

        response_text(&response)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| RepairError::new("Repair returned no text"))
    }

    fn text_config(json: bool) -> Result<GenerationConfig, ProviderError> {
        let mut builder = GenerationConfig::builder();
        builder.response_modalities(vec!["TEXT".to_string()]);
        if json {
            builder.response_mime_type("application/json");
        }
        builder
            .build()
            .map_err(|e| ProviderError::new(ProviderErrorKind::Builder(e.to_string())))
    }

    fn image_config(aspect_ratio: AspectRatio) -> Result<GenerationConfig, ProviderError> {
        GenerationConfig::builder()
            .response_modalities(vec!["IMAGE".to_string()])
            .image_config(ImageConfig {
                aspect_ratio: aspect_ratio.as_str().to_string(),
            })
            .build()
            .map_err(|e| ProviderError::new(ProviderErrorKind::Builder(e.to_string())))
    }
}

#[async_trait]
impl SceneAnalyzer for GeminiProvider {
    #[instrument(skip(self, script), fields(model = %self.config.text_model, script_len = script.len()))]
    async fn analyze(&self, script: &str) -> Result<Vec<SceneDescriptor>, AnalysisError> {
        let config = Self::text_config(true)
            .map_err(|e| AnalysisError::new(AnalysisErrorKind::Provider(e.to_string())))?;
        let request = GenerateContentRequest::user_text(script)
            .with_system(ANALYSIS_INSTRUCTION)
            .with_config(config);

        let response = self
            .generate(&self.config.text_model, &request)
            .await
            .map_err(|e| AnalysisError::new(AnalysisErrorKind::Provider(e.kind.to_string())))?;

        let text = response_text(&response)
            .ok_or_else(|| AnalysisError::new(AnalysisErrorKind::EmptyResponse))?;
        let scenes = parse_scenes(&text)?;
        info!(scene_count = scenes.len(), "Analyzed script");
        Ok(scenes)
    }
}

#[async_trait]
impl ImageRenderer for GeminiProvider {
    #[instrument(skip(self, prompt, aspect_ratio), fields(model = %self.config.image_model, aspect_ratio = %aspect_ratio))]
    async fn render(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
    ) -> Result<ImageData, RenderError> {
        let config = Self::image_config(aspect_ratio)
            .map_err(|e| RenderError::new(RenderErrorKind::Provider(e.to_string())))?;
        let request =
            GenerateContentRequest::user_text(self.styled_prompt(prompt)).with_config(config);

        let response = self
            .generate(&self.config.image_model, &request)
            .await
            .map_err(|e| {
                if e.kind.is_rate_limited() {
                    RenderError::new(RenderErrorKind::RateLimited(e.kind.to_string()))
                } else {
                    RenderError::new(RenderErrorKind::Provider(e.kind.to_string()))
                }
            })?;

        let image = extract_image(&response)?;
        debug!(mime_type = image.mime_type(), size = image.bytes().len(), "Rendered image");
        Ok(image)
    }
}

#[async_trait]
impl PromptRepair for GeminiProvider {
    #[instrument(skip(self, prompt), fields(model = %self.config.text_model))]
    async fn repair(&self, prompt: &str) -> String {
        match self.try_repair(prompt).await {
            Ok(rewritten) => rewritten,
            Err(e) => {
                warn!(error = %e, "Prompt repair failed, keeping original prompt");
                prompt.to_string()
            }
        }
    }
}
