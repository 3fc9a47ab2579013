//! Scripted collaborators that record how they were called.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use storyboard_core::{AspectRatio, ImageData, SceneDescriptor};
use storyboard_error::{AnalysisError, AnalysisErrorKind, RenderError, RenderErrorKind};
use storyboard_interface::{ImageRenderer, PromptRepair, SceneAnalyzer};

/// Analyzer returning a fixed answer.
pub struct FakeAnalyzer {
    response: Result<Vec<SceneDescriptor>, AnalysisError>,
    calls: AtomicUsize,
}

impl FakeAnalyzer {
    /// Answers with `scenes` as given.
    pub fn scenes(scenes: Vec<SceneDescriptor>) -> Self {
        Self {
            response: Ok(scenes),
            calls: AtomicUsize::new(0),
        }
    }

    /// Answers with one scene per prompt, indexed from 1.
    pub fn prompts(prompts: &[&str]) -> Self {
        Self::scenes(
            prompts
                .iter()
                .enumerate()
                .map(|(i, p)| SceneDescriptor::new(i as u32 + 1, format!("Scene {}", i + 1), *p))
                .collect(),
        )
    }

    /// Always fails.
    pub fn failing() -> Self {
        Self {
            response: Err(AnalysisError::new(AnalysisErrorKind::Parse(
                "not json".to_string(),
            ))),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SceneAnalyzer for FakeAnalyzer {
    async fn analyze(&self, _script: &str) -> Result<Vec<SceneDescriptor>, AnalysisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response.clone()
    }
}

/// Renderer that fails for chosen prompts and succeeds otherwise.
///
/// A successful render returns the prompt bytes as a PNG payload.
pub struct FakeRenderer {
    failing: Mutex<HashSet<String>>,
    rate_limited: bool,
    delay: Duration,
    prompts: Mutex<Vec<(String, AspectRatio)>>,
}

impl FakeRenderer {
    /// Succeeds for every prompt.
    pub fn new() -> Self {
        Self {
            failing: Mutex::new(HashSet::new()),
            rate_limited: false,
            delay: Duration::ZERO,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Fails with "no image" for the given prompts.
    pub fn failing_on(prompts: &[&str]) -> Self {
        let renderer = Self::new();
        renderer
            .failing
            .lock()
            .unwrap()
            .extend(prompts.iter().map(|p| p.to_string()));
        renderer
    }

    /// Failures report upstream rate limiting instead of a missing image.
    pub fn rate_limited(mut self) -> Self {
        self.rate_limited = true;
        self
    }

    /// Sleep before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Stop failing for `prompt`.
    pub fn heal(&self, prompt: &str) {
        self.failing.lock().unwrap().remove(prompt);
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    /// Prompts received, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap()
            .iter()
            .map(|(p, _)| p.clone())
            .collect()
    }

    /// Aspect ratios received, in call order.
    pub fn aspect_ratios(&self) -> Vec<AspectRatio> {
        self.prompts.lock().unwrap().iter().map(|(_, a)| *a).collect()
    }
}

#[async_trait]
impl ImageRenderer for FakeRenderer {
    async fn render(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
    ) -> Result<ImageData, RenderError> {
        self.prompts
            .lock()
            .unwrap()
            .push((prompt.to_string(), aspect_ratio));

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if self.failing.lock().unwrap().contains(prompt) {
            let kind = if self.rate_limited {
                RenderErrorKind::RateLimited("HTTP 429".to_string())
            } else {
                RenderErrorKind::NoImage("IMAGE_SAFETY".to_string())
            };
            return Err(RenderError::new(kind));
        }
        Ok(ImageData::new("image/png", prompt.as_bytes().to_vec()))
    }
}

/// Repair that answers with a fixed suggestion, or echoes the prompt.
pub struct FakeRepair {
    suggestion: Option<String>,
    calls: AtomicUsize,
}

impl FakeRepair {
    /// Always suggests `suggestion`.
    pub fn suggesting(suggestion: &str) -> Self {
        Self {
            suggestion: Some(suggestion.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Returns the prompt unchanged, like a repair call that failed.
    pub fn echo() -> Self {
        Self {
            suggestion: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PromptRepair for FakeRepair {
    async fn repair(&self, prompt: &str) -> String {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.suggestion
            .clone()
            .unwrap_or_else(|| prompt.to_string())
    }
}
