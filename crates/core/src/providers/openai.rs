//! OpenAI client: chat completions (text + vision) and DALL-E 3 images.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{excerpt, ChatMessage, ChatRequest, ImageProvider, ImageRequest, ProviderError, TextModel};
use crate::config::GenerationSettings;
use crate::models::ImageBackend;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    image_size: String,
    image_quality: String,
    image_style: String,
}

#[derive(Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Serialize)]
struct ImageGenerationBody<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u32,
    size: &'a str,
    quality: &'a str,
    style: &'a str,
}

#[derive(Deserialize)]
struct ImageGenerationResponse {
    #[serde(default)]
    data: Vec<ImageDatum>,
}

#[derive(Deserialize)]
struct ImageDatum {
    #[serde(default)]
    url: Option<String>,
}

impl OpenAiClient {
    pub fn new(api_key: impl Into<String>, settings: &GenerationSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: settings
                .openai_base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            image_size: settings.image_size.clone(),
            image_quality: settings.image_quality.clone(),
            image_style: settings.image_style.clone(),
        }
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, ProviderError>
    where
        B: Serialize + ?Sized,
        R: for<'de> Deserialize<'de>,
    {
        let response = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                provider: "OpenAI",
                status: status.as_u16(),
                body: excerpt(&body),
            });
        }

        Ok(response.json::<R>().await?)
    }
}

#[async_trait]
impl TextModel for OpenAiClient {
    async fn complete(&self, request: ChatRequest) -> Result<String, ProviderError> {
        let body = ChatCompletionBody {
            model: &request.config.model,
            messages: &request.messages,
            max_tokens: request.config.max_tokens,
            temperature: request.config.temperature,
        };

        tracing::debug!(model = %request.config.model, max_tokens = request.config.max_tokens, "chat completion");
        let response: ChatCompletionResponse = self.post_json("/v1/chat/completions", &body).await?;

        Ok(response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default())
    }
}

#[async_trait]
impl ImageProvider for OpenAiClient {
    async fn generate(&self, request: ImageRequest) -> Result<String, ProviderError> {
        if request.backend != ImageBackend::DallE3 {
            return Err(ProviderError::UnsupportedBackend {
                provider: "OpenAI",
                backend: request.backend,
            });
        }

        let body = ImageGenerationBody {
            model: request.backend.model_id(),
            prompt: &request.prompt,
            n: 1,
            size: &self.image_size,
            quality: &self.image_quality,
            style: &self.image_style,
        };

        let response: ImageGenerationResponse =
            self.post_json("/v1/images/generations", &body).await?;

        response
            .data
            .into_iter()
            .next()
            .and_then(|d| d.url)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| {
                ProviderError::MissingOutput(format!(
                    "{} returned no image URL",
                    request.backend.display_name()
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_override_trims_slash() {
        let settings = GenerationSettings {
            openai_base_url: Some("http://localhost:8080/".to_string()),
            ..GenerationSettings::default()
        };
        let client = OpenAiClient::new("sk-test", &settings);
        assert_eq!(client.base_url, "http://localhost:8080");
        assert_eq!(client.image_size, "1024x1024");
    }

    #[test]
    fn test_image_response_without_url() {
        let response: ImageGenerationResponse = serde_json::from_str(r#"{"data": [{}]}"#).unwrap();
        assert!(response.data[0].url.is_none());
    }

    #[tokio::test]
    async fn test_rejects_replicate_backend() {
        let client = OpenAiClient::new("sk-test", &GenerationSettings::default());
        let err = client
            .generate(ImageRequest::new(ImageBackend::FluxDev, "a cat"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::UnsupportedBackend { .. }));
    }
}
