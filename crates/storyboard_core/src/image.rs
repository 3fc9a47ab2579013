//! Rendered image payloads.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use storyboard_error::{ImageError, ImageErrorKind};

/// A rendered image: raw bytes plus MIME type.
///
/// Serializes as a `data:` URI so a history snapshot stays a flat
/// key/value document.
///
/// # Examples
///
/// ```
/// use storyboard_core::ImageData;
///
/// let image = ImageData::new("image/png", vec![0x89, 0x50, 0x4E, 0x47]);
/// let uri = image.to_data_uri();
/// assert!(uri.starts_with("data:image/png;base64,"));
/// assert_eq!(ImageData::from_data_uri(&uri).unwrap(), image);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageData {
    mime_type: String,
    bytes: Vec<u8>,
}

impl ImageData {
    /// Create an image payload.
    pub fn new(mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// MIME type reported by the renderer.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Raw image bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// File extension matching the MIME type.
    pub fn extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "image/jpeg" | "image/jpg" => "jpg",
            "image/webp" => "webp",
            "image/gif" => "gif",
            _ => "png",
        }
    }

    /// Encode as `data:<mime>;base64,<payload>`.
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.bytes))
    }

    /// Decode a `data:<mime>;base64,<payload>` URI.
    ///
    /// # Errors
    ///
    /// Returns an [`ImageError`] naming which part of the URI is malformed.
    pub fn from_data_uri(uri: &str) -> Result<Self, ImageError> {
        let rest = uri
            .strip_prefix("data:")
            .ok_or_else(|| ImageError::new(ImageErrorKind::NotDataUri))?;
        let (mime_type, payload) = rest
            .split_once(";base64,")
            .ok_or_else(|| ImageError::new(ImageErrorKind::NotBase64))?;
        let bytes = STANDARD
            .decode(payload)
            .map_err(|e| ImageError::new(ImageErrorKind::InvalidBase64(e.to_string())))?;
        Ok(Self::new(mime_type, bytes))
    }
}

impl Serialize for ImageData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_data_uri())
    }
}

impl<'de> Deserialize<'de> for ImageData {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let uri = String::deserialize(deserializer)?;
        ImageData::from_data_uri(&uri).map_err(serde::de::Error::custom)
    }
}
