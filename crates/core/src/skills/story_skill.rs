//! # Story Skill
//!
//! Stage 2: one complete narrative, later segmented into panels. The story
//! is internal and never reaches the client.

use std::sync::Arc;

use crate::domain::{CharacterSheet, GenerationRequest};
use crate::error::{GenerationError, GenerationResult};
use crate::models::TextModelConfig;
use crate::providers::{ChatMessage, ChatRequest, TextModel};
use crate::skills::prompts;

pub struct StorySkill {
    model: Arc<dyn TextModel>,
    config: TextModelConfig,
}

impl StorySkill {
    pub fn new(model: Arc<dyn TextModel>, config: TextModelConfig) -> Self {
        Self { model, config }
    }

    /// Any response is accepted; an empty completion becomes an empty story.
    pub async fn run(
        &self,
        request: &GenerationRequest,
        sheet: &CharacterSheet,
    ) -> GenerationResult<String> {
        let chat = ChatRequest::new(
            self.config.clone(),
            prompts::story_system_prompt(
                &request.prompt,
                &sheet.characters,
                &sheet.setting,
                request.tone,
                request.panel_count(),
            ),
            ChatMessage::user(prompts::story_user_prompt(&request.prompt)),
        );

        let story = self
            .model
            .complete(chat)
            .await
            .map_err(|e| GenerationError::provider("Story", e))?;

        if story.trim().is_empty() {
            tracing::warn!("story stage returned empty text");
        }
        Ok(story)
    }
}
