//! Shared application state: provider clients built once per process.

use std::sync::Arc;

use panelcraft_core::config::missing_credential_message;
use panelcraft_core::models::Provider;
use panelcraft_core::orchestrator::Orchestrator;
use panelcraft_core::providers::{ImageProvider, OpenAiClient, ReplicateClient, TextModel};
use panelcraft_core::{Credentials, GenerationError, GenerationSettings};

/// Which providers an endpoint needs before it may call anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Text, vision and DALL-E 3
    OpenAi,
    /// OpenAI plus the Flux reference chain
    OpenAiAndReplicate,
}

#[derive(Clone)]
pub struct AppState {
    text: Option<Arc<dyn TextModel>>,
    primary: Option<Arc<dyn ImageProvider>>,
    alternate: Option<Arc<dyn ImageProvider>>,
    settings: Arc<GenerationSettings>,
}

impl AppState {
    /// Build clients for whichever credentials are present.
    pub fn from_credentials(credentials: &Credentials, settings: GenerationSettings) -> Self {
        let openai = credentials
            .get(Provider::OpenAI)
            .map(|key| Arc::new(OpenAiClient::new(key, &settings)));
        let replicate = credentials
            .get(Provider::Replicate)
            .map(|token| Arc::new(ReplicateClient::new(token, &settings)) as Arc<dyn ImageProvider>);

        Self {
            text: openai.clone().map(|c| c as Arc<dyn TextModel>),
            primary: openai.map(|c| c as Arc<dyn ImageProvider>),
            alternate: replicate,
            settings: Arc::new(settings),
        }
    }

    /// Inject providers directly (tests, alternative backends).
    pub fn with_providers(
        text: Option<Arc<dyn TextModel>>,
        primary: Option<Arc<dyn ImageProvider>>,
        alternate: Option<Arc<dyn ImageProvider>>,
        settings: GenerationSettings,
    ) -> Self {
        Self {
            text,
            primary,
            alternate,
            settings: Arc::new(settings),
        }
    }

    pub fn is_configured(&self, provider: Provider) -> bool {
        match provider {
            Provider::OpenAI => self.text.is_some() && self.primary.is_some(),
            Provider::Replicate => self.alternate.is_some(),
        }
    }

    /// A per-request orchestrator, or a configuration error naming the
    /// first missing credential.
    pub fn orchestrator(&self, requirement: Requirement) -> Result<Orchestrator, GenerationError> {
        let (Some(text), Some(primary)) = (&self.text, &self.primary) else {
            return Err(GenerationError::Configuration(missing_credential_message(
                Provider::OpenAI,
            )));
        };

        let orchestrator =
            Orchestrator::new(text.clone(), primary.clone(), self.settings.as_ref().clone());

        match (requirement, &self.alternate) {
            (Requirement::OpenAi, None) => Ok(orchestrator),
            (_, Some(alternate)) => Ok(orchestrator.with_alternate(alternate.clone())),
            (Requirement::OpenAiAndReplicate, None) => Err(GenerationError::Configuration(
                missing_credential_message(Provider::Replicate),
            )),
        }
    }
}
