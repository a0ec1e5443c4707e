//! # Configuration
//!
//! Provider credentials and tunable generation settings. Both are built once
//! per process and handed to the orchestrator; nothing here is global.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::GenerationError;
use crate::models::{Provider, TextModelConfig};

/// External credentials for the two providers.
#[derive(Clone, Default)]
pub struct Credentials {
    pub openai_api_key: Option<String>,
    pub replicate_api_token: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| "***"))
            .field(
                "replicate_api_token",
                &self.replicate_api_token.as_ref().map(|_| "***"),
            )
            .finish()
    }
}

impl Credentials {
    /// Read `OPENAI_API_KEY` and `REPLICATE_API_TOKEN`. Empty values count as missing.
    pub fn from_env() -> Self {
        Self {
            openai_api_key: non_empty_env(Provider::OpenAI.env_var()),
            replicate_api_token: non_empty_env(Provider::Replicate.env_var()),
        }
    }

    pub fn get(&self, provider: Provider) -> Option<&str> {
        match provider {
            Provider::OpenAI => self.openai_api_key.as_deref(),
            Provider::Replicate => self.replicate_api_token.as_deref(),
        }
    }

    /// Fail with a configuration error if the credential is absent.
    pub fn require(&self, provider: Provider) -> Result<&str, GenerationError> {
        self.get(provider)
            .ok_or_else(|| GenerationError::Configuration(missing_credential_message(provider)))
    }
}

/// Human-readable configuration error for a missing credential.
pub fn missing_credential_message(provider: Provider) -> String {
    match provider {
        Provider::OpenAI => "OpenAI API key not configured".to_string(),
        Provider::Replicate => "Replicate API token not configured".to_string(),
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Tunables for every stage. All fields default to the values the pipeline
/// was designed around; a JSON settings file may override any subset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GenerationSettings {
    /// Text/vision model for every writing stage
    pub text_model: String,
    /// Optional base URL for OpenAI-compatible endpoints
    pub openai_base_url: Option<String>,
    /// Replicate API base URL
    pub replicate_base_url: String,
    pub character_max_tokens: u32,
    pub character_temperature: f32,
    pub story_max_tokens: u32,
    pub story_temperature: f32,
    /// Upper bound for panel segmentation; scaled by `panel_tokens_per_panel`
    pub panel_max_tokens: u32,
    pub panel_tokens_per_panel: u32,
    pub panel_temperature: f32,
    pub meme_max_tokens: u32,
    pub meme_temperature: f32,
    /// DALL-E output size
    pub image_size: String,
    pub image_quality: String,
    pub image_style: String,
    pub flux_guidance_scale: f32,
    pub flux_inference_steps: u32,
    pub schnell_inference_steps: u32,
    /// Attempts per panel in the non-streaming variant
    pub batch_retry_attempts: u32,
    /// Delay unit for batch retries; attempt `n` waits `n * delay`
    pub batch_retry_delay_ms: u64,
    /// Interval between Replicate prediction polls
    pub replicate_poll_interval_ms: u64,
    /// Maximum number of Replicate polls before giving up
    pub replicate_max_polls: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            text_model: "gpt-4o-mini".to_string(),
            openai_base_url: None,
            replicate_base_url: "https://api.replicate.com".to_string(),
            character_max_tokens: 600,
            character_temperature: 0.7,
            story_max_tokens: 800,
            story_temperature: 0.7,
            panel_max_tokens: 1000,
            panel_tokens_per_panel: 250,
            panel_temperature: 0.5,
            meme_max_tokens: 800,
            meme_temperature: 0.8,
            image_size: "1024x1024".to_string(),
            image_quality: "standard".to_string(),
            image_style: "vivid".to_string(),
            flux_guidance_scale: 7.5,
            flux_inference_steps: 28,
            schnell_inference_steps: 4,
            batch_retry_attempts: 3,
            batch_retry_delay_ms: 1000,
            replicate_poll_interval_ms: 1000,
            replicate_max_polls: 120,
        }
    }
}

impl GenerationSettings {
    /// Load settings from a JSON file. A missing file yields the defaults.
    pub async fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid settings file {}", path.display()))
    }

    pub fn character_model(&self) -> TextModelConfig {
        TextModelConfig::new(&self.text_model)
            .with_limits(self.character_max_tokens, self.character_temperature)
    }

    pub fn story_model(&self) -> TextModelConfig {
        TextModelConfig::new(&self.text_model)
            .with_limits(self.story_max_tokens, self.story_temperature)
    }

    /// Segmentation budget grows with the panel count, capped at `panel_max_tokens`.
    pub fn panel_model(&self, panel_count: usize) -> TextModelConfig {
        let scaled = self
            .panel_tokens_per_panel
            .saturating_mul(panel_count.min(u32::MAX as usize) as u32);
        TextModelConfig::new(&self.text_model)
            .with_limits(scaled.min(self.panel_max_tokens), self.panel_temperature)
    }

    pub fn meme_model(&self) -> TextModelConfig {
        TextModelConfig::new(&self.text_model)
            .with_limits(self.meme_max_tokens, self.meme_temperature)
    }

    pub fn batch_retry_delay(&self) -> Duration {
        Duration::from_millis(self.batch_retry_delay_ms)
    }

    pub fn replicate_poll_interval(&self) -> Duration {
        Duration::from_millis(self.replicate_poll_interval_ms)
    }
}
