//! Scene list normalization.

use storyboard_core::SceneDescriptor;

/// Put an analyzed scene list into generation order.
///
/// Scenes are stably sorted by index, so scenes sharing an index keep the
/// order the analyzer gave them. Scenes with blank prompts are dropped and
/// the rest renumbered `1..=N`. When nothing usable remains, the single
/// fallback scene built from `script` is returned.
pub fn normalize_scenes(mut scenes: Vec<SceneDescriptor>, script: &str) -> Vec<SceneDescriptor> {
    scenes.sort_by_key(|s| s.index);
    let scenes: Vec<_> = scenes
        .into_iter()
        .filter(|s| !s.image_prompt.trim().is_empty())
        .enumerate()
        .map(|(position, scene)| SceneDescriptor {
            index: position as u32 + 1,
            ..scene
        })
        .collect();

    if scenes.is_empty() {
        return vec![SceneDescriptor::fallback(script)];
    }
    scenes
}

#[cfg(test)]
mod tests {
    use super::*;
    use storyboard_core::FALLBACK_SUMMARY;

    fn pairs(scenes: &[SceneDescriptor]) -> Vec<(u32, &str)> {
        scenes
            .iter()
            .map(|s| (s.index, s.image_prompt.as_str()))
            .collect()
    }

    #[test]
    fn test_sorts_and_renumbers() {
        let scenes = vec![
            SceneDescriptor::new(7, "c", "third"),
            SceneDescriptor::new(2, "a", "first"),
            SceneDescriptor::new(4, "b", "  "),
            SceneDescriptor::new(5, "b", "second"),
        ];
        let normalized = normalize_scenes(scenes, "script");
        assert_eq!(pairs(&normalized), vec![(1, "first"), (2, "second"), (3, "third")]);
    }

    #[test]
    fn test_empty_list_falls_back() {
        let normalized = normalize_scenes(Vec::new(), "The whole story");
        assert_eq!(normalized.len(), 1);
        assert_eq!(normalized[0].summary, FALLBACK_SUMMARY);
        assert_eq!(normalized[0].image_prompt, "The whole story");
    }

    #[test]
    fn test_shared_indices_keep_analyzer_order() {
        let scenes = vec![
            SceneDescriptor::new(2, "c", "last"),
            SceneDescriptor::new(1, "a", "first"),
            SceneDescriptor::new(1, "b", "again"),
        ];
        let normalized = normalize_scenes(scenes, "script");
        assert_eq!(
            pairs(&normalized),
            vec![(1, "first"), (2, "again"), (3, "last")]
        );
    }
}
