//! # Character Skill
//!
//! Stage 1: designs the recurring cast and the setting. Unparseable output
//! is replaced with a single placeholder character, so this stage only
//! fails when the text model itself cannot be reached.

use std::sync::Arc;

use crate::domain::{CharacterSheet, GenerationRequest};
use crate::error::{GenerationError, GenerationResult};
use crate::models::TextModelConfig;
use crate::providers::{ChatMessage, ChatRequest, TextModel};
use crate::skills::{parsing, prompts};

pub struct CharacterSkill {
    model: Arc<dyn TextModel>,
    config: TextModelConfig,
}

impl CharacterSkill {
    pub fn new(model: Arc<dyn TextModel>, config: TextModelConfig) -> Self {
        Self { model, config }
    }

    pub async fn run(&self, request: &GenerationRequest) -> GenerationResult<CharacterSheet> {
        let chat = ChatRequest::new(
            self.config.clone(),
            prompts::character_system_prompt(
                &request.prompt,
                request.panel_count(),
                request.art_style,
                request.tone,
            ),
            ChatMessage::user(prompts::character_user_prompt(&request.prompt)),
        );

        let content = self
            .model
            .complete(chat)
            .await
            .map_err(|e| GenerationError::provider("Character design", e))?;

        match parsing::parse_character_sheet(&content) {
            Ok(sheet) => {
                tracing::debug!(characters = sheet.characters.len(), setting = %sheet.setting, "characters designed");
                Ok(sheet)
            }
            Err(e) => {
                tracing::warn!(error = %e, "character sheet did not parse, using placeholder");
                Ok(CharacterSheet::fallback())
            }
        }
    }
}
