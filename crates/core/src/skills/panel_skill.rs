//! # Panel Skill
//!
//! Stage 3: splits the story into exactly `panel_count` descriptions.
//!
//! Tiers, in order: JSON array, `Panel <n>` markers, deterministic
//! placeholders. Whatever tier wins, the result is fitted to the grid.

use std::sync::Arc;

use crate::domain::{CharacterSheet, GenerationRequest};
use crate::error::{GenerationError, GenerationResult};
use crate::models::TextModelConfig;
use crate::providers::{ChatMessage, ChatRequest, TextModel};
use crate::skills::{parsing, prompts};

pub struct PanelSkill {
    model: Arc<dyn TextModel>,
    config: TextModelConfig,
}

impl PanelSkill {
    pub fn new(model: Arc<dyn TextModel>, config: TextModelConfig) -> Self {
        Self { model, config }
    }

    pub async fn run(
        &self,
        request: &GenerationRequest,
        sheet: &CharacterSheet,
        story: &str,
    ) -> GenerationResult<Vec<String>> {
        let count = request.panel_count();
        let chat = ChatRequest::new(
            self.config.clone(),
            prompts::panel_system_prompt(story, &sheet.characters, &sheet.setting, count),
            ChatMessage::user(prompts::panel_user_prompt(count)),
        );

        let content = self
            .model
            .complete(chat)
            .await
            .map_err(|e| GenerationError::provider("Panel segmentation", e))?;

        let descriptions = match parsing::parse_panel_descriptions(&content) {
            Ok(parsed) => {
                if parsed.len() != count {
                    tracing::warn!(expected = count, got = parsed.len(), "panel count mismatch, fitting to grid");
                }
                parsing::fit_panel_count(parsed, &request.prompt, count)
            }
            Err(e) => {
                tracing::warn!(error = %e, "panel descriptions did not parse, using placeholders");
                parsing::fallback_panel_descriptions(&request.prompt, count)
            }
        };

        Ok(descriptions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ArtStyle, GridSize, Tone};
    use crate::testing::ScriptedText;

    fn request(grid: &str) -> GenerationRequest {
        GenerationRequest::new("a cat trying to cook", GridSize::parse(grid).unwrap(), ArtStyle::Cartoon, Tone::Funny)
            .unwrap()
    }

    async fn segment(response: &str, grid: &str) -> Vec<String> {
        let model = Arc::new(ScriptedText::new([response]));
        PanelSkill::new(model, TextModelConfig::default())
            .run(&request(grid), &CharacterSheet::fallback(), "story")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_json_array() {
        let panels = segment(r#"["Panel 1: a", "Panel 2: b"]"#, "1x2").await;
        assert_eq!(panels, vec!["Panel 1: a", "Panel 2: b"]);
    }

    #[tokio::test]
    async fn test_extra_panels_truncated() {
        let panels = segment(r#"["a", "b", "c", "d", "e"]"#, "2x2").await;
        assert_eq!(panels.len(), 4);
        assert_eq!(panels[3], "d");
    }

    #[tokio::test]
    async fn test_missing_panels_padded() {
        let panels = segment("Panel 1: the cat wakes up.", "1x2").await;
        assert_eq!(panels[0], "Panel 1: the cat wakes up.");
        assert_eq!(panels[1], parsing::fallback_panel_description("a cat trying to cook", 1));
    }

    #[tokio::test]
    async fn test_garbage_is_deterministic() {
        let first = segment("no idea", "3x3").await;
        let second = segment("still no idea", "3x3").await;
        assert_eq!(first.len(), 9);
        assert_eq!(first, second);
        assert_eq!(first, parsing::fallback_panel_descriptions("a cat trying to cook", 9));
    }
}
