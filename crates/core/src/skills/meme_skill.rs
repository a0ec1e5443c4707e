//! # Meme Skill
//!
//! Caption synthesis for an uploaded image. Always yields exactly
//! [`MEME_VARIANT_COUNT`] upper-cased caption pairs.

use std::sync::Arc;

use crate::domain::{MemeRequest, MemeVariant};
use crate::error::{GenerationError, GenerationResult};
use crate::models::TextModelConfig;
use crate::providers::{ChatMessage, ChatRequest, TextModel};
use crate::skills::parsing::{self, ParseError};
use crate::skills::prompts;

pub const MEME_VARIANT_COUNT: usize = 6;

pub struct MemeSkill {
    model: Arc<dyn TextModel>,
    config: TextModelConfig,
}

impl MemeSkill {
    pub fn new(model: Arc<dyn TextModel>, config: TextModelConfig) -> Self {
        Self { model, config }
    }

    #[tracing::instrument(skip_all, fields(style = %request.style))]
    pub async fn run(&self, request: &MemeRequest) -> GenerationResult<Vec<MemeVariant>> {
        let chat = ChatRequest::new(
            self.config.clone(),
            prompts::meme_system_prompt(request.style, &request.custom_prompt),
            ChatMessage::user_with_image(
                prompts::meme_user_prompt(request.style, &request.custom_prompt),
                &request.image_data,
            ),
        );

        let content = self
            .model
            .complete(chat)
            .await
            .map_err(|e| GenerationError::provider("Meme vision", e))?;

        let fallback = prompts::fallback_captions(request.style);
        let captions = match parsing::parse_meme_captions(&content) {
            Ok(parsed) => parsed,
            Err(ParseError::Empty) => {
                tracing::warn!("model returned no captions, using generic set");
                prompts::generic_captions()
            }
            Err(e) => {
                tracing::warn!(error = %e, "meme captions did not parse, using style fallback");
                fallback.clone()
            }
        };

        Ok(fill_to_count(captions, &fallback))
    }
}

/// Truncate to the variant count, padding from `fallback` without repeats.
fn fill_to_count(mut captions: Vec<MemeVariant>, fallback: &[MemeVariant]) -> Vec<MemeVariant> {
    captions.truncate(MEME_VARIANT_COUNT);
    for extra in fallback {
        if captions.len() >= MEME_VARIANT_COUNT {
            break;
        }
        if !captions.contains(extra) {
            captions.push(extra.clone());
        }
    }
    captions
}
