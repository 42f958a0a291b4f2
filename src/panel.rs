//! The comic panel record.

use serde::{Deserialize, Serialize};

/// One panel of a generated comic strip.
///
/// Constructed by the response parser; `image_data` is attached afterwards
/// during image acquisition and the panel is otherwise never mutated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Panel {
    /// Sequence number as emitted by the model. Gaps and duplicates are
    /// preserved, not renumbered.
    pub panel_number: u32,
    /// Visual setting and atmosphere of the panel.
    pub scene: String,
    /// Character dialogue lines, each already in `Speaker: text` form.
    pub dialogue: Vec<String>,
    /// Optional narration text for context.
    pub narration: Option<String>,
    /// Prompt used to request artwork for this panel.
    pub image_prompt: String,
    /// Base64-encoded PNG payload, set once image acquisition has run.
    pub image_data: Option<String>,
}

impl Panel {
    /// Creates a panel without image data.
    pub fn new(
        panel_number: u32,
        scene: String,
        dialogue: Vec<String>,
        narration: Option<String>,
        image_prompt: String,
    ) -> Self {
        Self {
            panel_number,
            scene,
            dialogue,
            narration,
            image_prompt,
            image_data: None,
        }
    }
}

impl std::fmt::Display for Panel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Panel {}: [Scene: {}]", self.panel_number, self.scene)?;
        if let Some(narration) = &self.narration {
            write!(f, "\nNarration: {narration}")?;
        }
        for line in &self.dialogue {
            write!(f, "\n{line}")?;
        }
        if !self.image_prompt.is_empty() {
            write!(f, "\nImage: Generated from prompt")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_orders_scene_narration_dialogue() {
        let panel = Panel::new(
            2,
            "A castle at dawn".to_string(),
            vec![
                "Arthur: \"Onward!\"".to_string(),
                "Squire: \"Right behind you.\"".to_string(),
            ],
            Some("The siege begins.".to_string()),
            "A castle at dawn".to_string(),
        );
        let rendered = panel.to_string();
        assert_eq!(
            rendered,
            "Panel 2: [Scene: A castle at dawn]\n\
             Narration: The siege begins.\n\
             Arthur: \"Onward!\"\n\
             Squire: \"Right behind you.\"\n\
             Image: Generated from prompt"
        );
    }

    #[test]
    fn display_omits_missing_narration() {
        let panel = Panel::new(1, "A field".to_string(), Vec::new(), None, "A field".to_string());
        let rendered = panel.to_string();
        assert!(!rendered.contains("Narration:"));
        assert!(rendered.starts_with("Panel 1: [Scene: A field]"));
    }

    #[test]
    fn serializes_with_exactly_the_expected_keys() {
        let panel = Panel::new(3, "Cave mouth".to_string(), Vec::new(), None, "Cave mouth".to_string());
        let value = serde_json::to_value(&panel).expect("serialize panel");
        let object = value.as_object().expect("panel serializes to an object");
        let mut keys: Vec<_> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec![
                "dialogue",
                "image_data",
                "image_prompt",
                "narration",
                "panel_number",
                "scene"
            ]
        );
        assert_eq!(object["narration"], serde_json::Value::Null);
        assert_eq!(object["image_data"], serde_json::Value::Null);
    }
}
