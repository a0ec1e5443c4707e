//! # Providers
//!
//! Seams between the pipeline and the remote model APIs.
//!
//! ```text
//! Orchestrator
//!   ├── TextModel      (character, story, panel and meme stages)
//!   └── ImageProvider  (primary: DALL-E 3, alternate: Flux on Replicate)
//! ```
//!
//! Concrete clients live in [`openai`] and [`replicate`]; tests substitute
//! in-memory implementations.

pub mod openai;
pub mod replicate;

use async_trait::async_trait;
use serde::Serialize;

use crate::models::{ImageBackend, TextModelConfig};

pub use openai::OpenAiClient;
pub use replicate::ReplicateClient;

/// Errors raised by a single provider call.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The HTTP request itself failed (network, DNS, TLS, decode).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider answered with a non-2xx status.
    #[error("{provider} API error ({status}): {body}")]
    Api {
        provider: &'static str,
        status: u16,
        body: String,
    },

    /// The call succeeded but carried no usable output.
    #[error("No output returned: {0}")]
    MissingOutput(String),

    /// A Replicate prediction ended in `failed` or `canceled`.
    #[error("Prediction {status}: {message}")]
    PredictionFailed { status: String, message: String },

    /// A Replicate prediction never reached a terminal state.
    #[error("Prediction did not finish after {polls} polls")]
    PollingExhausted { polls: u32 },

    /// The backend is not served by this provider.
    #[error("{provider} cannot serve backend {backend:?}")]
    UnsupportedBackend {
        provider: &'static str,
        backend: ImageBackend,
    },

    /// The previous panel URL cannot be used as a visual reference.
    #[error("Invalid previous panel URL: {0}")]
    InvalidReference(String),
}

/// Chat message role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// One part of a multimodal message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageUrl {
    pub url: String,
    pub detail: String,
}

/// Message body: plain text or a list of parts (vision).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: MessageContent,
}

impl ChatMessage {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Text(text.into()),
        }
    }

    /// A user message carrying text plus an inline image.
    pub fn user_with_image(text: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Parts(vec![
                ContentPart::Text { text: text.into() },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: image_url.into(),
                        detail: "high".to_string(),
                    },
                },
            ]),
        }
    }

    /// Concatenated text of the message (image parts skipped).
    pub fn text(&self) -> String {
        match &self.content {
            MessageContent::Text(text) => text.clone(),
            MessageContent::Parts(parts) => parts
                .iter()
                .filter_map(|p| match p {
                    ContentPart::Text { text } => Some(text.as_str()),
                    ContentPart::ImageUrl { .. } => None,
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// A single chat completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub config: TextModelConfig,
    pub messages: Vec<ChatMessage>,
}

impl ChatRequest {
    pub fn new(config: TextModelConfig, system: impl Into<String>, user: ChatMessage) -> Self {
        Self {
            config,
            messages: vec![ChatMessage::system(system), user],
        }
    }
}

/// A single image generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRequest {
    pub backend: ImageBackend,
    pub prompt: String,
    /// Previous panel, passed only to reference-conditioned backends
    pub reference_image: Option<String>,
    pub seed: u32,
}

impl ImageRequest {
    pub fn new(backend: ImageBackend, prompt: impl Into<String>) -> Self {
        Self {
            backend,
            prompt: prompt.into(),
            reference_image: None,
            seed: random_seed(),
        }
    }

    pub fn with_reference(mut self, url: impl Into<String>) -> Self {
        self.reference_image = Some(url.into());
        self
    }
}

/// Text and vision completions.
#[async_trait]
pub trait TextModel: Send + Sync {
    /// Returns the assistant message text; an empty completion is `Ok("")`.
    async fn complete(&self, request: ChatRequest) -> Result<String, ProviderError>;
}

/// Image synthesis returning a resolvable image URL.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    async fn generate(&self, request: ImageRequest) -> Result<String, ProviderError>;
}

/// Seed in `0..1_000_000` (not cryptographic).
pub fn random_seed() -> u32 {
    use std::collections::hash_map::RandomState;
    use std::hash::{BuildHasher, Hasher};
    (RandomState::new().build_hasher().finish() % 1_000_000) as u32
}

/// Truncate a response body for error messages.
pub(crate) fn excerpt(body: &str) -> String {
    const LIMIT: usize = 500;
    if body.chars().count() <= LIMIT {
        body.to_string()
    } else {
        format!("{}...", body.chars().take(LIMIT).collect::<String>())
    }
}
