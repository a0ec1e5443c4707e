//! # Errors
//!
//! Error taxonomy shared by the pipeline and the HTTP layer.

use crate::providers::ProviderError;

/// Errors that can escape a generation request.
///
/// Parse failures are deliberately absent: malformed model output is always
/// recovered locally with deterministic fallback content.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// The caller supplied missing or malformed input.
    #[error("{0}")]
    Validation(String),

    /// A provider credential is missing.
    #[error("{0}")]
    Configuration(String),

    /// A text or vision model call failed outright.
    #[error("{stage} request failed: {source}")]
    Provider {
        stage: &'static str,
        #[source]
        source: ProviderError,
    },

    /// Every backend in the fallback cascade failed for one panel.
    #[error("Failed to generate panel {}", index + 1)]
    PanelFailed {
        index: usize,
        #[source]
        source: ProviderError,
    },
}

impl GenerationError {
    pub fn provider(stage: &'static str, source: ProviderError) -> Self {
        Self::Provider { stage, source }
    }

    /// True for errors the caller caused (surfaced as 4xx).
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

pub type GenerationResult<T> = Result<T, GenerationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panel_failed_message_is_one_based() {
        let err = GenerationError::PanelFailed {
            index: 2,
            source: ProviderError::MissingOutput("no url".to_string()),
        };
        assert_eq!(err.to_string(), "Failed to generate panel 3");
    }

    #[test]
    fn test_client_error_classification() {
        assert!(GenerationError::Validation("Prompt is required".into()).is_client_error());
        assert!(!GenerationError::Configuration("missing key".into()).is_client_error());
    }
}
