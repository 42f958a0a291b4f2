//! Builds the instruction text sent to the text model.

/// Builds the comic conversion prompt for a story.
///
/// The story is embedded verbatim; the model is expected to cope with
/// arbitrary natural-language input, so nothing is truncated or sanitized
/// here.
pub fn build_comic_prompt(story: &str, max_panels: u32) -> String {
    format!(
        r#"You are an expert comic strip creator. Analyze the following story and convert it into a comic strip format with up to {max_panels} panels.

For each panel, provide:
1. A scene description (visual setting and atmosphere)
2. An image generation prompt (detailed, visual description for creating the artwork)
3. Character dialogues (if any) in the format "Character Name: dialogue"
4. Narration text (if needed for context)

Format your response exactly like this for each panel:

PANEL [number]
SCENE: [Brief scene description]
IMAGE_PROMPT: [Detailed visual description for image generation - include art style (comic book art, vibrant colors, bold outlines), character descriptions, setting details, lighting, mood, and composition. Make it very detailed and specific for generating artwork.]
DIALOGUE:
- [Character Name]: "[Their dialogue]"
- [Character Name]: "[Their dialogue]"
NARRATION: [Optional narration text]

Story to convert:
{story}

Important: For IMAGE_PROMPT, create detailed, vivid descriptions that would work well for AI image generation. Include:
- Art style: "Comic book style art with bold black outlines and vibrant colors"
- Characters: Physical appearance, clothing, expressions, poses
- Setting: Environment details, time of day, atmosphere
- Composition: Camera angle, foreground/background elements
- Mood: Overall feeling and lighting

Please create engaging, visually descriptive comic panels that capture the key moments and emotions of the story."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embeds_story_verbatim() {
        let story = "A dragon with a thorn in its foot.\n\"Ouch,\" it said.";
        let prompt = build_comic_prompt(story, 6);
        assert!(prompt.contains(story));
    }

    #[test]
    fn states_the_panel_limit() {
        let prompt = build_comic_prompt("A story.", 4);
        assert!(prompt.contains("up to 4 panels"));
    }

    #[test]
    fn spells_out_the_output_grammar() {
        let prompt = build_comic_prompt("A story.", 10);
        for label in ["PANEL [number]", "SCENE:", "IMAGE_PROMPT:", "DIALOGUE:", "NARRATION:"] {
            assert!(prompt.contains(label), "prompt is missing {label}");
        }
    }
}
