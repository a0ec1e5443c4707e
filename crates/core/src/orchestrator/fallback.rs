//! # Panel Fallback Cascade
//!
//! Renders one panel of the reference-chained comic.
//!
//! ```text
//! panel 0:   DALL-E 3 ──fail──> DALL-E 3 (once more) ──fail──> panel-failed
//! panel i>0: flux-kontext-max ─> flux-dev ─> flux-schnell ─> DALL-E 3 ─> panel-failed
//!            (invalid previous URL jumps straight to DALL-E 3)
//! ```
//!
//! A `panel-error` event precedes every fallback attempt.

use std::sync::Arc;

use super::events::ComicEvent;
use super::pipeline::PanelState;
use super::sink::EventSink;
use crate::error::GenerationError;
use crate::models::ImageBackend;
use crate::providers::{ImageProvider, ImageRequest, ProviderError};
use crate::skills::prompts::PanelPrompt;

/// A successfully rendered panel and how it got there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPanel {
    pub url: String,
    pub backend: ImageBackend,
    /// Produced by the cross-provider (or repeated primary) fallback
    pub fell_back: bool,
}

impl RenderedPanel {
    pub fn completion_message(&self, index: usize) -> String {
        let number = index + 1;
        match (self.backend, self.fell_back) {
            (ImageBackend::DallE3, false) => format!("Panel {} completed!", number),
            (ImageBackend::DallE3, true) => {
                format!("Panel {} completed (DALL-E 3 fallback)!", number)
            }
            (backend, _) => format!("Panel {} completed with {}!", number, backend.display_name()),
        }
    }
}

/// Usable as an image reference: non-empty and starting with `http`.
pub fn is_valid_reference(url: &str) -> bool {
    url.starts_with("http")
}

pub struct PanelRenderer {
    primary: Arc<dyn ImageProvider>,
    alternate: Option<Arc<dyn ImageProvider>>,
}

impl PanelRenderer {
    pub fn new(primary: Arc<dyn ImageProvider>, alternate: Option<Arc<dyn ImageProvider>>) -> Self {
        Self { primary, alternate }
    }

    /// Render panel `index`. `previous_url` is the URL of panel `index - 1`.
    pub async fn render(
        &self,
        index: usize,
        prompt: &PanelPrompt<'_>,
        previous_url: Option<&str>,
        sink: &dyn EventSink,
        state: &mut PanelState,
    ) -> Result<RenderedPanel, GenerationError> {
        state.start();
        let number = index + 1;

        if index == 0 {
            match self.primary_attempt(prompt).await {
                Ok(url) => return Ok(self.done(state, url, ImageBackend::DallE3, false)),
                Err(e) => {
                    tracing::warn!(panel = number, error = %e, "primary image generation failed");
                    state.retry();
                    sink.emit(ComicEvent::panel_error(
                        index,
                        format!("Error generating panel {}, trying fallback...", number),
                    ))
                    .await;
                }
            }
        } else {
            match (&self.alternate, previous_url) {
                (Some(alternate), Some(previous)) if is_valid_reference(previous) => {
                    if let Some(panel) = self
                        .reference_chain(alternate.as_ref(), index, prompt, previous, sink, state)
                        .await
                    {
                        return Ok(panel);
                    }
                }
                (Some(_), previous) => {
                    tracing::warn!(panel = number, previous = ?previous, "invalid previous panel URL, skipping reference chain");
                    state.retry();
                    sink.emit(ComicEvent::panel_error(
                        index,
                        format!("Error generating panel {}, trying fallback...", number),
                    ))
                    .await;
                }
                (None, _) => {
                    tracing::debug!(panel = number, "no alternate image provider, using primary");
                }
            }
        }

        match self.primary_attempt(prompt).await {
            Ok(url) => Ok(self.done(state, url, ImageBackend::DallE3, true)),
            Err(source) => {
                tracing::error!(panel = number, error = %source, "panel exhausted every fallback");
                state.fail();
                sink.emit(ComicEvent::panel_failed(index)).await;
                Err(GenerationError::PanelFailed { index, source })
            }
        }
    }

    /// Walk the reference chain. `None` means every tier failed and a
    /// `panel-error` announcing the cross-provider fallback was emitted.
    async fn reference_chain(
        &self,
        alternate: &dyn ImageProvider,
        index: usize,
        prompt: &PanelPrompt<'_>,
        previous: &str,
        sink: &dyn EventSink,
        state: &mut PanelState,
    ) -> Option<RenderedPanel> {
        let number = index + 1;
        let chain = ImageBackend::REFERENCE_CHAIN;

        for (tier, backend) in chain.iter().copied().enumerate() {
            let mut request = ImageRequest::new(backend, prompt.for_backend(backend));
            if backend.supports_reference() {
                request = request.with_reference(previous);
            }

            match alternate.generate(request).await {
                Ok(url) => return Some(self.done(state, url, backend, false)),
                Err(e) => {
                    tracing::warn!(panel = number, backend = backend.display_name(), error = %e, "image backend failed");
                    state.retry();
                    let message = match chain.get(tier + 1) {
                        Some(next) => format!(
                            "{} failed for panel {}, trying {}...",
                            backend.display_name(),
                            number,
                            next.display_name()
                        ),
                        None => format!(
                            "Flux failed for panel {}, using DALL-E 3 fallback...",
                            number
                        ),
                    };
                    sink.emit(ComicEvent::panel_error(index, message)).await;
                }
            }
        }
        None
    }

    async fn primary_attempt(&self, prompt: &PanelPrompt<'_>) -> Result<String, ProviderError> {
        self.primary
            .generate(ImageRequest::new(ImageBackend::DallE3, prompt.primary()))
            .await
    }

    fn done(
        &self,
        state: &mut PanelState,
        url: String,
        backend: ImageBackend,
        fell_back: bool,
    ) -> RenderedPanel {
        state.complete();
        RenderedPanel {
            url,
            backend,
            fell_back,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ArtStyle, Tone};
    use crate::testing::{RecordingSink, ScriptedImages};

    const CAST: &str = "Whiskers: orange tabby in a chef hat";

    fn prompt() -> PanelPrompt<'static> {
        PanelPrompt {
            art_style: ArtStyle::Cartoon,
            tone: Tone::Funny,
            description: "Panel 2: smoke fills the kitchen",
            characters: CAST,
        }
    }

    struct Harness {
        primary: Arc<ScriptedImages>,
        alternate: Arc<ScriptedImages>,
        sink: RecordingSink,
    }

    impl Harness {
        fn new(primary: ScriptedImages, alternate: ScriptedImages) -> Self {
            Self {
                primary: Arc::new(primary),
                alternate: Arc::new(alternate),
                sink: RecordingSink::default(),
            }
        }

        async fn render(
            &self,
            index: usize,
            previous: Option<&str>,
        ) -> (Result<RenderedPanel, GenerationError>, PanelState) {
            let renderer = PanelRenderer::new(self.primary.clone(), Some(self.alternate.clone()));
            let mut state = PanelState::Pending;
            let result = renderer
                .render(index, &prompt(), previous, &self.sink, &mut state)
                .await;
            (result, state)
        }
    }

    #[tokio::test]
    async fn test_first_panel_uses_primary_only() {
        let h = Harness::new(ScriptedImages::new(), ScriptedImages::new());
        let (result, state) = h.render(0, None).await;
        let panel = result.unwrap();
        assert_eq!(panel.backend, ImageBackend::DallE3);
        assert_eq!(panel.completion_message(0), "Panel 1 completed!");
        assert_eq!(state, PanelState::Complete);
        assert!(h.alternate.backends().is_empty());
        assert!(h.sink.names().is_empty());
    }

    #[tokio::test]
    async fn test_reference_tier_gets_previous_url() {
        let h = Harness::new(ScriptedImages::new(), ScriptedImages::new());
        let (result, _) = h.render(1, Some("https://img.test/0.png")).await;
        assert_eq!(result.unwrap().backend, ImageBackend::FluxKontextMax);

        let requests = h.alternate.requests.lock().unwrap();
        assert_eq!(requests[0].reference_image.as_deref(), Some("https://img.test/0.png"));
        assert!(requests[0].prompt.contains(CAST));
    }

    #[tokio::test]
    async fn test_kontext_failure_falls_to_flux_dev() {
        let h = Harness::new(
            ScriptedImages::new(),
            ScriptedImages::failing(&[ImageBackend::FluxKontextMax]),
        );
        let (result, state) = h.render(1, Some("https://img.test/0.png")).await;
        let panel = result.unwrap();
        assert_eq!(panel.backend, ImageBackend::FluxDev);
        assert_eq!(panel.completion_message(1), "Panel 2 completed with flux-dev!");
        assert_eq!(state, PanelState::Complete);
        assert_eq!(h.sink.names(), vec!["panel-error"]);

        let requests = h.alternate.requests.lock().unwrap();
        assert!(requests[1].reference_image.is_none());
    }

    #[tokio::test]
    async fn test_whole_chain_fails_over_to_primary() {
        let h = Harness::new(
            ScriptedImages::new(),
            ScriptedImages::failing(&ImageBackend::REFERENCE_CHAIN),
        );
        let (result, _) = h.render(2, Some("https://img.test/1.png")).await;
        let panel = result.unwrap();
        assert!(panel.fell_back);
        assert_eq!(panel.completion_message(2), "Panel 3 completed (DALL-E 3 fallback)!");
        assert_eq!(h.sink.names(), vec!["panel-error"; 3]);
        assert_eq!(h.alternate.backends(), ImageBackend::REFERENCE_CHAIN.to_vec());
    }

    #[tokio::test]
    async fn test_invalid_reference_skips_chain() {
        let h = Harness::new(ScriptedImages::new(), ScriptedImages::new());
        let (result, _) = h.render(1, Some("data:image/png;base64,AAAA")).await;
        assert_eq!(result.unwrap().backend, ImageBackend::DallE3);
        assert!(h.alternate.backends().is_empty());
        assert_eq!(h.sink.names(), vec!["panel-error"]);
    }

    #[tokio::test]
    async fn test_exhaustion_emits_panel_failed() {
        let h = Harness::new(
            ScriptedImages::failing(&[ImageBackend::DallE3]),
            ScriptedImages::failing(&ImageBackend::REFERENCE_CHAIN),
        );
        let (result, state) = h.render(1, Some("https://img.test/0.png")).await;
        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "Failed to generate panel 2");
        assert_eq!(state, PanelState::Failed);
        assert_eq!(
            h.sink.names(),
            vec!["panel-error", "panel-error", "panel-error", "panel-failed"]
        );
    }

    #[tokio::test]
    async fn test_first_panel_retries_primary_once() {
        let h = Harness::new(ScriptedImages::flaky(1), ScriptedImages::new());
        let (result, state) = h.render(0, None).await;
        assert!(result.unwrap().fell_back);
        assert_eq!(state, PanelState::Complete);
        assert_eq!(h.primary.backends(), vec![ImageBackend::DallE3; 2]);
        assert_eq!(h.sink.names(), vec!["panel-error"]);
    }
}
