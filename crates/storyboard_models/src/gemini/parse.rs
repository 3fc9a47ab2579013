//! Turning Gemini replies into scenes, images and text.

use crate::gemini::dto::GenerateContentResponse;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use serde_json::Value;
use storyboard_core::{ImageData, SceneDescriptor};
use storyboard_error::{AnalysisError, AnalysisErrorKind, RenderError, RenderErrorKind};

/// Remove a surrounding Markdown code fence (```` ```json ... ``` ````).
///
/// Models asked for JSON still wrap it in fences now and then.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening fence line.
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawScene {
    #[serde(default)]
    index: Option<u32>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default, alias = "image_prompt", alias = "prompt")]
    image_prompt: Option<String>,
}

/// Parse an analysis reply into scene descriptors.
///
/// Accepts a JSON array of scenes, a single scene object, or an object with
/// a `scenes` array. Scenes without a positive index get their 1-based
/// position.
pub fn parse_scenes(text: &str) -> Result<Vec<SceneDescriptor>, AnalysisError> {
    let body = strip_code_fences(text);
    if body.is_empty() {
        return Err(AnalysisError::new(AnalysisErrorKind::EmptyResponse));
    }

    let value: Value = serde_json::from_str(body)
        .map_err(|e| AnalysisError::new(AnalysisErrorKind::Parse(e.to_string())))?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("scenes") {
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(AnalysisError::new(AnalysisErrorKind::InvalidShape(format!(
                    "`scenes` is not an array: {}",
                    other
                ))));
            }
            None => vec![Value::Object(map)],
        },
        other => {
            return Err(AnalysisError::new(AnalysisErrorKind::InvalidShape(
                other.to_string(),
            )));
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(position, item)| {
            let raw: RawScene = serde_json::from_value(item)
                .map_err(|e| AnalysisError::new(AnalysisErrorKind::InvalidShape(e.to_string())))?;
            let index = raw
                .index
                .filter(|i| *i > 0)
                .unwrap_or(position as u32 + 1);
            Ok(SceneDescriptor::new(
                index,
                raw.summary.unwrap_or_default(),
                raw.image_prompt.unwrap_or_default(),
            ))
        })
        .collect()
}

/// Concatenated text parts of the first candidate.
pub fn response_text(response: &GenerateContentResponse) -> Option<String> {
    let content = response.candidates.first()?.content.as_ref()?;
    let text: String = content
        .parts
        .iter()
        .filter_map(|p| p.text.as_deref())
        .collect();
    (!text.trim().is_empty()).then_some(text)
}

/// First inline image of the first candidate.
///
/// A reply without an image is a [`RenderErrorKind::NoImage`] carrying the
/// block reason, finish reason or whatever text the model sent instead.
pub fn extract_image(response: &GenerateContentResponse) -> Result<ImageData, RenderError> {
    let inline = response
        .candidates
        .iter()
        .filter_map(|c| c.content.as_ref())
        .flat_map(|c| c.parts.iter())
        .find_map(|p| p.inline_data.as_ref());

    let Some(inline) = inline else {
        return Err(RenderError::new(RenderErrorKind::NoImage(no_image_reason(
            response,
        ))));
    };

    let bytes = STANDARD
        .decode(inline.data.trim())
        .map_err(|e| RenderError::new(RenderErrorKind::InvalidPayload(e.to_string())))?;
    Ok(ImageData::new(inline.mime_type.clone(), bytes))
}

fn no_image_reason(response: &GenerateContentResponse) -> String {
    if let Some(reason) = response
        .prompt_feedback
        .as_ref()
        .and_then(|f| f.block_reason.clone())
    {
        return format!("prompt blocked ({})", reason);
    }
    let finish = response
        .candidates
        .first()
        .and_then(|c| c.finish_reason.clone());
    match (finish, response_text(response)) {
        (Some(reason), Some(text)) => format!("{}: {}", reason, text.trim()),
        (Some(reason), None) => reason,
        (None, Some(text)) => text.trim().to_string(),
        (None, None) => "empty response".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gemini::dto::{Candidate, Content, InlineData, Part, PromptFeedback};

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n[1]\n```"), "[1]");
        assert_eq!(strip_code_fences("```\n{}\n```\n"), "{}");
        assert_eq!(strip_code_fences("  [2] "), "[2]");
    }

    #[test]
    fn test_parse_array() {
        let scenes = parse_scenes(
            r#"[{"index":1,"summary":"Dawn","imagePrompt":"A village at dawn"},
                {"index":2,"summary":"Dusk","imagePrompt":"The same village at dusk"}]"#,
        )
        .unwrap();
        assert_eq!(scenes.len(), 2);
        assert_eq!(scenes[1].index, 2);
        assert_eq!(scenes[1].image_prompt, "The same village at dusk");
    }

    #[test]
    fn test_single_object_becomes_one_scene() {
        let scenes = parse_scenes(r#"{"summary":"Only","imagePrompt":"A lone tree"}"#).unwrap();
        assert_eq!(scenes, vec![SceneDescriptor::new(1, "Only", "A lone tree")]);
    }

    #[test]
    fn test_scenes_wrapper_and_missing_indices() {
        let scenes = parse_scenes(
            "```json\n{\"scenes\":[{\"summary\":\"a\",\"prompt\":\"p1\"},{\"index\":0,\"summary\":\"b\",\"image_prompt\":\"p2\"}]}\n```",
        )
        .unwrap();
        let indices: Vec<_> = scenes.iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![1, 2]);
        assert_eq!(scenes[1].image_prompt, "p2");
    }

    #[test]
    fn test_malformed_replies() {
        assert!(matches!(
            parse_scenes("").unwrap_err().kind,
            AnalysisErrorKind::EmptyResponse
        ));
        assert!(matches!(
            parse_scenes("not json").unwrap_err().kind,
            AnalysisErrorKind::Parse(_)
        ));
        assert!(matches!(
            parse_scenes("42").unwrap_err().kind,
            AnalysisErrorKind::InvalidShape(_)
        ));
    }

    #[test]
    fn test_extract_image() {
        let response = GenerateContentResponse {
            candidates: vec![Candidate {
                content: Some(Content {
                    role: Some("model".to_string()),
                    parts: vec![
                        Part::text("Here you go"),
                        Part {
                            text: None,
                            inline_data: Some(InlineData {
                                mime_type: "image/png".to_string(),
                                data: "AQID".to_string(),
                            }),
                        },
                    ],
                }),
                finish_reason: Some("STOP".to_string()),
            }],
            prompt_feedback: None,
        };
        let image = extract_image(&response).unwrap();
        assert_eq!(image.mime_type(), "image/png");
        assert_eq!(image.bytes(), &[1, 2, 3]);
    }

    #[test]
    fn test_blocked_prompt_is_no_image() {
        let response = GenerateContentResponse {
            candidates: vec![],
            prompt_feedback: Some(PromptFeedback {
                block_reason: Some("SAFETY".to_string()),
            }),
        };
        let err = extract_image(&response).unwrap_err();
        assert_eq!(
            err.kind,
            RenderErrorKind::NoImage("prompt blocked (SAFETY)".to_string())
        );
    }

    #[test]
    fn test_text_only_reply_is_no_image() {
        let response = GenerateContentResponse {
            candidates: vec![Candidate {
                content: Some(Content::user("I can't draw that.")),
                finish_reason: Some("IMAGE_SAFETY".to_string()),
            }],
            prompt_feedback: None,
        };
        let err = extract_image(&response).unwrap_err();
        assert_eq!(
            err.kind,
            RenderErrorKind::NoImage("IMAGE_SAFETY: I can't draw that.".to_string())
        );
    }
}
