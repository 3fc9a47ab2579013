//! Scene descriptors produced by script analysis.

use serde::{Deserialize, Serialize};

/// Summary given to the single scene used when analysis yields nothing usable.
pub const FALLBACK_SUMMARY: &str = "Single scene";

/// One segment of a script, ready to be rendered.
///
/// `index` is 1-based and unique within one analysis result; it defines the
/// generation order.
///
/// # Examples
///
/// ```
/// use storyboard_core::SceneDescriptor;
///
/// let scene = SceneDescriptor::fallback("A fox crosses a frozen river.");
/// assert_eq!(scene.index, 1);
/// assert_eq!(scene.image_prompt, "A fox crosses a frozen river.");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneDescriptor {
    /// Position in script order, starting at 1
    pub index: u32,
    /// Short description of what happens in the scene
    pub summary: String,
    /// Detailed prompt handed to the image renderer
    pub image_prompt: String,
}

impl SceneDescriptor {
    /// Create a scene descriptor.
    pub fn new(index: u32, summary: impl Into<String>, image_prompt: impl Into<String>) -> Self {
        Self {
            index,
            summary: summary.into(),
            image_prompt: image_prompt.into(),
        }
    }

    /// The degenerate single scene whose prompt is the whole script.
    pub fn fallback(script: &str) -> Self {
        Self::new(1, FALLBACK_SUMMARY, script)
    }
}
