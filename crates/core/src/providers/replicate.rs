//! Replicate client for the Flux family.
//!
//! Predictions are created with `Prefer: wait`, so most calls resolve in a
//! single round trip. Anything still running afterwards is polled through
//! its `urls.get` link.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{excerpt, ImageProvider, ImageRequest, ProviderError};
use crate::config::GenerationSettings;
use crate::models::ImageBackend;

#[derive(Debug, Clone)]
pub struct ReplicateClient {
    http: reqwest::Client,
    api_token: String,
    base_url: String,
    guidance_scale: f32,
    inference_steps: u32,
    schnell_steps: u32,
    poll_interval: Duration,
    max_polls: u32,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    #[serde(default)]
    status: String,
    #[serde(default)]
    output: Value,
    #[serde(default)]
    error: Option<Value>,
    #[serde(default)]
    urls: Option<PredictionUrls>,
}

#[derive(Debug, Deserialize)]
struct PredictionUrls {
    get: Option<String>,
}

impl Prediction {
    fn is_terminal(&self) -> bool {
        matches!(self.status.as_str(), "succeeded" | "failed" | "canceled")
    }
}

impl ReplicateClient {
    pub fn new(api_token: impl Into<String>, settings: &GenerationSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_token: api_token.into(),
            base_url: settings.replicate_base_url.trim_end_matches('/').to_string(),
            guidance_scale: settings.flux_guidance_scale,
            inference_steps: settings.flux_inference_steps,
            schnell_steps: settings.schnell_inference_steps,
            poll_interval: settings.replicate_poll_interval(),
            max_polls: settings.replicate_max_polls,
        }
    }

    /// Model input for one backend.
    fn prediction_input(&self, request: &ImageRequest) -> Result<Value, ProviderError> {
        let mut input = json!({
            "prompt": request.prompt,
            "output_format": "jpg",
            "seed": request.seed,
        });

        match request.backend {
            ImageBackend::FluxKontextMax => {
                let reference = request
                    .reference_image
                    .as_deref()
                    .filter(|url| url.starts_with("http"))
                    .ok_or_else(|| {
                        ProviderError::InvalidReference(
                            request.reference_image.clone().unwrap_or_default(),
                        )
                    })?;
                input["input_image"] = json!(reference);
                input["guidance_scale"] = json!(self.guidance_scale);
                input["num_inference_steps"] = json!(self.inference_steps);
            }
            ImageBackend::FluxDev => {
                input["guidance_scale"] = json!(self.guidance_scale);
                input["num_inference_steps"] = json!(self.inference_steps);
            }
            ImageBackend::FluxSchnell => {
                input["num_inference_steps"] = json!(self.schnell_steps);
            }
            ImageBackend::DallE3 => {
                return Err(ProviderError::UnsupportedBackend {
                    provider: "Replicate",
                    backend: request.backend,
                })
            }
        }

        Ok(input)
    }

    async fn read_prediction(&self, response: reqwest::Response) -> Result<Prediction, ProviderError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                provider: "Replicate",
                status: status.as_u16(),
                body: excerpt(&body),
            });
        }
        Ok(response.json::<Prediction>().await?)
    }

    async fn wait_for(&self, mut prediction: Prediction) -> Result<Prediction, ProviderError> {
        let mut polls = 0;
        while !prediction.is_terminal() {
            if polls >= self.max_polls {
                return Err(ProviderError::PollingExhausted { polls });
            }
            let url = prediction
                .urls
                .as_ref()
                .and_then(|u| u.get.clone())
                .ok_or_else(|| ProviderError::MissingOutput("prediction has no poll URL".into()))?;

            tokio::time::sleep(self.poll_interval).await;
            polls += 1;

            let response = self
                .http
                .get(&url)
                .bearer_auth(&self.api_token)
                .send()
                .await?;
            prediction = self.read_prediction(response).await?;
            tracing::debug!(status = %prediction.status, polls, "polled prediction");
        }
        Ok(prediction)
    }
}

#[async_trait]
impl ImageProvider for ReplicateClient {
    async fn generate(&self, request: ImageRequest) -> Result<String, ProviderError> {
        let input = self.prediction_input(&request)?;
        let url = format!(
            "{}/v1/models/{}/predictions",
            self.base_url,
            request.backend.model_id()
        );

        let response = self
            .http
            .post(url)
            .bearer_auth(&self.api_token)
            .header("Prefer", "wait")
            .json(&json!({ "input": input }))
            .send()
            .await?;

        let prediction = self.read_prediction(response).await?;
        let prediction = self.wait_for(prediction).await?;

        if prediction.status != "succeeded" {
            let message = match prediction.error {
                Some(Value::String(s)) => s,
                Some(other) => other.to_string(),
                None => "no error detail".to_string(),
            };
            return Err(ProviderError::PredictionFailed {
                status: prediction.status,
                message,
            });
        }

        extract_output_url(&prediction.output).ok_or_else(|| {
            ProviderError::MissingOutput(format!(
                "{} returned an unexpected output format",
                request.backend.display_name()
            ))
        })
    }
}

/// Pull an image URL out of a prediction output: a bare string, the first
/// string of an array, or an object carrying `url`.
pub fn extract_output_url(output: &Value) -> Option<String> {
    let url = match output {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => items.first().and_then(extract_output_url),
        Value::Object(map) => map.get("url").and_then(|v| v.as_str()).map(str::to_string),
        _ => None,
    };
    url.filter(|u| !u.is_empty())
}
