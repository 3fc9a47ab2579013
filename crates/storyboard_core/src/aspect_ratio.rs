//! Output aspect ratios supported by the image renderer.

use serde::{Deserialize, Serialize};

/// Aspect ratio of a rendered scene.
///
/// Serialized with the colon notation the renderer expects (`"16:9"`).
///
/// # Examples
///
/// ```
/// use storyboard_core::AspectRatio;
///
/// let ratio: AspectRatio = "9:16".parse().unwrap();
/// assert_eq!(ratio, AspectRatio::Portrait);
/// assert_eq!(ratio.to_string(), "9:16");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumIter,
    derive_more::Display,
)]
pub enum AspectRatio {
    /// 1:1
    #[serde(rename = "1:1")]
    #[display("1:1")]
    Square,
    /// 16:9
    #[default]
    #[serde(rename = "16:9")]
    #[display("16:9")]
    Landscape,
    /// 9:16
    #[serde(rename = "9:16")]
    #[display("9:16")]
    Portrait,
    /// 4:3
    #[serde(rename = "4:3")]
    #[display("4:3")]
    Standard,
    /// 3:4
    #[serde(rename = "3:4")]
    #[display("3:4")]
    StandardPortrait,
}

impl AspectRatio {
    /// Colon notation used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Landscape => "16:9",
            AspectRatio::Portrait => "9:16",
            AspectRatio::Standard => "4:3",
            AspectRatio::StandardPortrait => "3:4",
        }
    }
}

impl std::str::FromStr for AspectRatio {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1:1" => Ok(AspectRatio::Square),
            "16:9" => Ok(AspectRatio::Landscape),
            "9:16" => Ok(AspectRatio::Portrait),
            "4:3" => Ok(AspectRatio::Standard),
            "3:4" => Ok(AspectRatio::StandardPortrait),
            other => Err(format!("Unknown aspect ratio: {}", other)),
        }
    }
}
