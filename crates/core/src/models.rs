//! # Panelcraft Models
//!
//! Centralized model configuration types: which text model handles the
//! writing stages and which image backends make up the fallback cascade.

use serde::{Deserialize, Serialize};

/// Remote providers the pipeline talks to.
///
/// - OpenAI - `OPENAI_API_KEY` (text, vision, DALL-E 3)
/// - Replicate - `REPLICATE_API_TOKEN` (Flux family)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[serde(rename = "openai")]
    OpenAI,
    Replicate,
}

impl Provider {
    /// Display name for logs and error messages
    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::OpenAI => "OpenAI",
            Provider::Replicate => "Replicate",
        }
    }

    /// Environment variable holding the credential
    pub fn env_var(&self) -> &'static str {
        match self {
            Provider::OpenAI => "OPENAI_API_KEY",
            Provider::Replicate => "REPLICATE_API_TOKEN",
        }
    }
}

/// Image generation backends, in the order the cascade knows them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ImageBackend {
    /// Primary high-quality model. Used for panel 0 and as the cross-provider fallback.
    DallE3,
    /// Reference-conditioned: takes the previous panel as an input image.
    FluxKontextMax,
    /// Same family without image reference support.
    FluxDev,
    /// Fast, few-step last resort.
    FluxSchnell,
}

impl ImageBackend {
    /// Reference chain tried (in order) for every panel after the first.
    pub const REFERENCE_CHAIN: [ImageBackend; 3] = [
        ImageBackend::FluxKontextMax,
        ImageBackend::FluxDev,
        ImageBackend::FluxSchnell,
    ];

    /// Get all backends
    pub fn all() -> Vec<ImageBackend> {
        vec![
            ImageBackend::DallE3,
            ImageBackend::FluxKontextMax,
            ImageBackend::FluxDev,
            ImageBackend::FluxSchnell,
        ]
    }

    /// Display name for progress messages
    pub fn display_name(&self) -> &'static str {
        match self {
            ImageBackend::DallE3 => "DALL-E 3",
            ImageBackend::FluxKontextMax => "flux-kontext-max",
            ImageBackend::FluxDev => "flux-dev",
            ImageBackend::FluxSchnell => "flux-schnell",
        }
    }

    /// Model identifier sent to the provider
    pub fn model_id(&self) -> &'static str {
        match self {
            ImageBackend::DallE3 => "dall-e-3",
            ImageBackend::FluxKontextMax => "black-forest-labs/flux-kontext-max",
            ImageBackend::FluxDev => "black-forest-labs/flux-dev",
            ImageBackend::FluxSchnell => "black-forest-labs/flux-schnell",
        }
    }

    pub fn provider(&self) -> Provider {
        match self {
            ImageBackend::DallE3 => Provider::OpenAI,
            _ => Provider::Replicate,
        }
    }

    /// Whether the backend accepts the previous panel as an input image
    pub fn supports_reference(&self) -> bool {
        matches!(self, ImageBackend::FluxKontextMax)
    }
}

/// Configuration for one text/vision model call.
///
/// ## Example
/// ```rust,ignore
/// use panelcraft_core::models::TextModelConfig;
///
/// let config = TextModelConfig::new("gpt-4o-mini").with_limits(600, 0.7);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextModelConfig {
    /// Model name (e.g., "gpt-4o-mini")
    pub model: String,
    /// Completion token cap
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
}

impl Default for TextModelConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            max_tokens: 800,
            temperature: 0.7,
        }
    }
}

impl TextModelConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }

    /// Set token cap and temperature
    pub fn with_limits(mut self, max_tokens: u32, temperature: f32) -> Self {
        self.max_tokens = max_tokens;
        self.temperature = temperature;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TextModelConfig::default();
        assert_eq!(config.model, "gpt-4o-mini");
    }

    #[test]
    fn test_reference_chain_order() {
        assert_eq!(ImageBackend::REFERENCE_CHAIN[0], ImageBackend::FluxKontextMax);
        assert!(ImageBackend::REFERENCE_CHAIN[0].supports_reference());
        assert!(!ImageBackend::FluxDev.supports_reference());
        assert!(ImageBackend::REFERENCE_CHAIN
            .iter()
            .all(|b| b.provider() == Provider::Replicate));
    }

    #[test]
    fn test_provider_mapping() {
        assert_eq!(ImageBackend::DallE3.provider(), Provider::OpenAI);
        assert_eq!(Provider::Replicate.env_var(), "REPLICATE_API_TOKEN");
        assert_eq!(ImageBackend::all().len(), 4);
    }

    #[test]
    fn test_model_config_serialization() {
        let config = TextModelConfig::new("gpt-4o").with_limits(600, 0.5);
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("gpt-4o"));
        assert!(json.contains("600"));
    }
}
