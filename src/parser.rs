//! Parses the text model's free-text reply into panel records.
//!
//! This is a pure function over strings so it can be exercised against
//! malformed model output without any network calls.

use std::sync::LazyLock;

use regex::Regex;

use crate::panel::Panel;

// The patterns are fixed strings, so compilation can't fail at runtime.
#[allow(clippy::expect_used)]
static PANEL_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"PANEL\s+(\d+)").expect("panel marker pattern"));

#[allow(clippy::expect_used)]
static SCENE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)SCENE:\s*(.+)").expect("scene pattern"));

#[allow(clippy::expect_used)]
static IMAGE_PROMPT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)IMAGE_PROMPT:\s*(.+?)(?:DIALOGUE:|NARRATION:|PANEL|\z)")
        .expect("image prompt pattern")
});

#[allow(clippy::expect_used)]
static DIALOGUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)DIALOGUE:\s*(.+?)(?:NARRATION:|PANEL|\z)").expect("dialogue pattern")
});

#[allow(clippy::expect_used)]
static NARRATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)NARRATION:\s*(.+?)(?:\n|PANEL|\z)").expect("narration pattern")
});

/// Fallback scene description when the reply omits the `SCENE:` label.
pub const UNKNOWN_SCENE: &str = "Unknown scene";

/// Parses a model reply into panels, in the order their markers appear.
///
/// Panel numbers are taken verbatim from the markers; gaps and duplicates
/// are preserved and nothing is clipped to the requested maximum. Text
/// before the first marker is discarded, and a marker with no trailing
/// content is skipped. Missing fields degrade to defaults rather than
/// failing.
pub fn parse_comic_response(response_text: &str) -> Vec<Panel> {
    let markers: Vec<_> = PANEL_MARKER.captures_iter(response_text).collect();

    let mut panels = Vec::with_capacity(markers.len());
    for (index, captures) in markers.iter().enumerate() {
        let Some(marker) = captures.get(0) else {
            continue;
        };
        let Some(number) = captures.get(1) else {
            continue;
        };
        // Numbers too large for u32 don't occur in practice; skip the unit.
        let Ok(panel_number) = number.as_str().parse::<u32>() else {
            continue;
        };

        let content_end = markers
            .get(index + 1)
            .and_then(|next| next.get(0))
            .map_or(response_text.len(), |next| next.start());
        let content = &response_text[marker.end()..content_end];
        if content.trim().is_empty() {
            continue;
        }

        panels.push(parse_panel_content(panel_number, content));
    }

    panels
}

fn parse_panel_content(panel_number: u32, content: &str) -> Panel {
    let scene = capture_trimmed(&SCENE, content).unwrap_or_else(|| UNKNOWN_SCENE.to_string());

    let image_prompt = capture_trimmed(&IMAGE_PROMPT, content).unwrap_or_else(|| scene.clone());

    let dialogue = DIALOGUE
        .captures(content)
        .and_then(|captures| captures.get(1))
        .map(|block| parse_dialogue_block(block.as_str()))
        .unwrap_or_default();

    let narration = capture_trimmed(&NARRATION, content).filter(|text| !text.is_empty());

    Panel::new(panel_number, scene, dialogue, narration, image_prompt)
}

fn capture_trimmed(pattern: &Regex, content: &str) -> Option<String> {
    pattern
        .captures(content)
        .and_then(|captures| captures.get(1))
        .map(|capture| capture.as_str().trim().to_string())
}

/// Extracts dialogue entries from a `DIALOGUE:` block.
///
/// Only lines starting with a bullet marker count; the marker is stripped
/// and anything left blank is dropped. Non-bullet lines inside the block
/// are ignored entirely rather than merged into neighbouring entries.
fn parse_dialogue_block(block: &str) -> Vec<String> {
    block
        .lines()
        .map(str::trim)
        .filter_map(|line| {
            let entry = line
                .strip_prefix('-')
                .or_else(|| line.strip_prefix('*'))?
                .trim();
            if entry.is_empty() {
                None
            } else {
                Some(entry.to_string())
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const THREE_PANEL_REPLY: &str = r#"Here's your comic strip!

PANEL 1
SCENE: A sunlit meadow outside a stone castle
IMAGE_PROMPT: Comic book style art, a knight in silver armor standing in a sunlit meadow,
castle towers in the background, morning light, low camera angle.
DIALOGUE:
- Sir Arthur: "I must find the dragon's lair."
NARRATION: Once upon a time, a brave knight set out on a quest.

PANEL 2
SCENE: A dark forest path
IMAGE_PROMPT: Dense dark forest, twisted trees, a knight leading his horse along a narrow path.
DIALOGUE:
- Sir Arthur: "These woods grow darker by the hour."
- Horse: "..."

PANEL 3
SCENE: A smoking cave entrance on a mountainside
DIALOGUE:
- Dragon: "Who dares enter my domain?"
NARRATION: At last, the mountain.
"#;

    #[test]
    fn parses_each_marked_panel_in_order() {
        let panels = parse_comic_response(THREE_PANEL_REPLY);
        assert_eq!(panels.len(), 3);
        assert_eq!(
            panels.iter().map(|p| p.panel_number).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(panels[0].scene, "A sunlit meadow outside a stone castle");
        assert_eq!(
            panels[0].narration.as_deref(),
            Some("Once upon a time, a brave knight set out on a quest.")
        );
        assert_eq!(
            panels[1].dialogue,
            vec![
                r#"Sir Arthur: "These woods grow darker by the hour.""#,
                "Horse: \"...\"",
            ]
        );
        assert_eq!(panels[2].narration.as_deref(), Some("At last, the mountain."));
    }

    #[test]
    fn discards_text_before_the_first_marker() {
        let panels = parse_comic_response(THREE_PANEL_REPLY);
        assert!(!panels.iter().any(|p| p.scene.contains("comic strip")));
    }

    #[test]
    fn image_prompt_spans_lines_until_the_next_label() {
        let panels = parse_comic_response(THREE_PANEL_REPLY);
        let prompt = &panels[0].image_prompt;
        assert!(prompt.starts_with("Comic book style art"));
        assert!(prompt.ends_with("low camera angle."));
        assert!(prompt.contains('\n'));
        assert!(!prompt.contains("DIALOGUE"));
    }

    #[test]
    fn missing_scene_defaults_to_unknown() {
        let reply = "PANEL 1\nDIALOGUE:\n- A: \"hello\"\n";
        let panels = parse_comic_response(reply);
        assert_eq!(panels.len(), 1);
        assert_eq!(panels[0].scene, UNKNOWN_SCENE);
    }

    #[test]
    fn missing_image_prompt_falls_back_to_scene() {
        let panels = parse_comic_response(THREE_PANEL_REPLY);
        assert_eq!(
            panels[2].image_prompt,
            "A smoking cave entrance on a mountainside"
        );
    }

    #[test]
    fn dialogue_keeps_only_bullet_lines() {
        let reply = "PANEL 1\nSCENE: A tavern\nDIALOGUE:\n\
                     - Barkeep: \"What'll it be?\"\n\
                     The room goes quiet.\n\
                     * Stranger: \"Water.\"\n\
                     -\n\
                     - \n";
        let panels = parse_comic_response(reply);
        assert_eq!(
            panels[0].dialogue,
            vec![r#"Barkeep: "What'll it be?""#, r#"Stranger: "Water.""#]
        );
    }

    #[test]
    fn field_order_within_a_panel_does_not_matter() {
        let reply = "PANEL 7\nNARRATION: Later that day.\nDIALOGUE:\n- A: \"hi\"\nSCENE: A bridge\n";
        let panels = parse_comic_response(reply);
        assert_eq!(panels[0].panel_number, 7);
        assert_eq!(panels[0].scene, "A bridge");
        assert_eq!(panels[0].narration.as_deref(), Some("Later that day."));
        assert_eq!(panels[0].dialogue, vec!["A: \"hi\""]);
    }

    #[test]
    fn labels_match_case_insensitively() {
        let reply = "PANEL 1\nscene: A rooftop\nimage_prompt: Rooftop at night\nnarration: Midnight.\n";
        let panels = parse_comic_response(reply);
        assert_eq!(panels[0].scene, "A rooftop");
        assert_eq!(panels[0].image_prompt, "Rooftop at night");
        assert_eq!(panels[0].narration.as_deref(), Some("Midnight."));
    }

    #[test]
    fn preserves_gaps_and_duplicates_in_panel_numbers() {
        let reply = "PANEL 2\nSCENE: First\nPANEL 5\nSCENE: Second\nPANEL 5\nSCENE: Third\n";
        let numbers: Vec<_> = parse_comic_response(reply)
            .iter()
            .map(|p| p.panel_number)
            .collect();
        assert_eq!(numbers, vec![2, 5, 5]);
    }

    #[test]
    fn skips_a_trailing_marker_with_no_content() {
        let reply = "PANEL 1\nSCENE: A dock\nPANEL 2";
        let panels = parse_comic_response(reply);
        assert_eq!(panels.len(), 1);
        assert_eq!(panels[0].scene, "A dock");
    }

    #[test]
    fn keeps_panels_beyond_requested_maximum() {
        // The request limit only rides in the prompt; the parser keeps
        // whatever the model actually produced.
        let reply = (1..=8)
            .map(|n| format!("PANEL {n}\nSCENE: Scene {n}\n"))
            .collect::<String>();
        let panels = parse_comic_response(reply.as_str());
        assert_eq!(panels.len(), 8);
    }

    #[test]
    fn empty_reply_yields_no_panels() {
        assert!(parse_comic_response("").is_empty());
        assert!(parse_comic_response("No panels here, sorry.").is_empty());
    }

    #[test]
    fn narration_capture_stops_at_end_of_line() {
        let reply = "PANEL 1\nSCENE: A hall\nNARRATION: The feast began.\nExtra prose that is not narration.\n";
        let panels = parse_comic_response(reply);
        assert_eq!(panels[0].narration.as_deref(), Some("The feast began."));
    }
}
