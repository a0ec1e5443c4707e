//! # Orchestrator
//!
//! Runs a comic request end to end: characters, story, panel descriptions,
//! then images. Two image policies exist:
//!
//! - [`Orchestrator::run_streaming`]: panels rendered one at a time, each
//!   conditioned on the previous one, with progress events on a sink.
//! - [`Orchestrator::run_batch`]: panels rendered concurrently with the
//!   primary model only, each retried with linear backoff.

use std::sync::Arc;

use futures::future::try_join_all;

use super::events::ComicEvent;
use super::fallback::PanelRenderer;
use super::pipeline::{PanelState, Pipeline};
use super::retry::retry_with_backoff;
use super::sink::{EventSink, NullSink};
use crate::config::GenerationSettings;
use crate::domain::{
    CharacterSheet, Comic, GenerationRequest, MemeRequest, MemeVariant, Panel,
};
use crate::error::{GenerationError, GenerationResult};
use crate::models::ImageBackend;
use crate::providers::{ImageProvider, ImageRequest, TextModel};
use crate::skills::prompts::{self, PanelPrompt};
use crate::skills::{CharacterSkill, MemeSkill, PanelSkill, StorySkill};

/// Output of the three writing stages.
struct Script {
    sheet: CharacterSheet,
    descriptions: Vec<String>,
}

pub struct Orchestrator {
    text: Arc<dyn TextModel>,
    primary: Arc<dyn ImageProvider>,
    alternate: Option<Arc<dyn ImageProvider>>,
    settings: GenerationSettings,
}

impl Orchestrator {
    pub fn new(
        text: Arc<dyn TextModel>,
        primary: Arc<dyn ImageProvider>,
        settings: GenerationSettings,
    ) -> Self {
        Self {
            text,
            primary,
            alternate: None,
            settings,
        }
    }

    /// Provider for the reference chain (panels after the first).
    pub fn with_alternate(mut self, alternate: Arc<dyn ImageProvider>) -> Self {
        self.alternate = Some(alternate);
        self
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    /// Reference-chained generation with progress events.
    ///
    /// On failure an `error` event is emitted. The sink is closed exactly
    /// once either way.
    #[tracing::instrument(skip_all, fields(grid = %request.grid, style = %request.art_style, tone = %request.tone))]
    pub async fn run_streaming(
        &self,
        request: &GenerationRequest,
        sink: &dyn EventSink,
    ) -> GenerationResult<Comic> {
        let mut pipeline = Pipeline::new();
        let result = self.stream_stages(request, sink, &mut pipeline).await;

        match &result {
            Ok(comic) => {
                tracing::info!(panels = comic.panels.len(), "comic complete");
            }
            Err(e) => {
                pipeline.fail();
                tracing::error!(error = %e, completed = pipeline.completed_panels(), "comic generation failed");
                sink.emit(ComicEvent::error(e)).await;
            }
        }

        sink.close().await;
        result
    }

    async fn stream_stages(
        &self,
        request: &GenerationRequest,
        sink: &dyn EventSink,
        pipeline: &mut Pipeline,
    ) -> GenerationResult<Comic> {
        let total = request.panel_count();
        sink.emit(ComicEvent::start(total, request.grid)).await;

        let script = self.write_script(request, sink, pipeline).await?;
        let clause = prompts::character_clause(&script.sheet.characters);

        pipeline.begin_images(script.descriptions.len());
        self.enter_stage(sink, pipeline).await;

        let renderer = PanelRenderer::new(self.primary.clone(), self.alternate.clone());
        let mut panels: Vec<Panel> = Vec::with_capacity(total);
        let mut previous_url: Option<String> = None;

        for (index, description) in script.descriptions.iter().enumerate() {
            sink.emit(ComicEvent::panel_start(index, script.descriptions.len(), description))
                .await;

            let prompt = PanelPrompt {
                art_style: request.art_style,
                tone: request.tone,
                description,
                characters: &clause,
            };
            let mut state = PanelState::Pending;
            let rendered = renderer
                .render(index, &prompt, previous_url.as_deref(), sink, &mut state)
                .await;
            if let Some(slot) = pipeline.panel_mut(index) {
                *slot = state;
            }
            let rendered = rendered?;

            let panel = Panel {
                url: rendered.url.clone(),
                description: description.clone(),
            };
            sink.emit(ComicEvent::panel_complete(
                index,
                panel.clone(),
                rendered.completion_message(index),
            ))
            .await;

            previous_url = Some(rendered.url);
            panels.push(panel);
        }

        pipeline.advance();
        let comic = Comic {
            panels,
            grid_layout: request.grid.to_string(),
        };
        sink.emit(ComicEvent::complete(&comic)).await;
        Ok(comic)
    }

    /// Concurrent generation with the primary model. Panel order follows the
    /// descriptions; any panel exhausting its retries fails the whole comic.
    #[tracing::instrument(skip_all, fields(grid = %request.grid, style = %request.art_style, tone = %request.tone))]
    pub async fn run_batch(&self, request: &GenerationRequest) -> GenerationResult<Comic> {
        let mut pipeline = Pipeline::new();
        let script = self.write_script(request, &NullSink, &mut pipeline).await?;
        let clause = prompts::character_clause(&script.sheet.characters);
        pipeline.begin_images(script.descriptions.len());

        let attempts = self.settings.batch_retry_attempts;
        let delay = self.settings.batch_retry_delay();

        let renders = script.descriptions.iter().enumerate().map(|(index, description)| {
            let prompt = PanelPrompt {
                art_style: request.art_style,
                tone: request.tone,
                description,
                characters: &clause,
            }
            .primary();
            let primary = self.primary.clone();
            async move {
                let url = retry_with_backoff(attempts, delay, |attempt| {
                    tracing::debug!(panel = index + 1, attempt, "rendering panel");
                    primary.generate(ImageRequest::new(ImageBackend::DallE3, prompt.clone()))
                })
                .await
                .map_err(|source| GenerationError::PanelFailed { index, source })?;

                Ok::<_, GenerationError>(Panel {
                    url,
                    description: description.clone(),
                })
            }
        });

        let panels = try_join_all(renders).await.inspect_err(|e| {
            tracing::error!(error = %e, "batch comic generation failed");
        })?;

        pipeline.advance();
        tracing::info!(panels = panels.len(), "comic complete");
        Ok(Comic {
            panels,
            grid_layout: request.grid.to_string(),
        })
    }

    /// Stages 1-3. Never fails on unparseable model output.
    async fn write_script(
        &self,
        request: &GenerationRequest,
        sink: &dyn EventSink,
        pipeline: &mut Pipeline,
    ) -> GenerationResult<Script> {
        let s = &self.settings;

        self.enter_stage(sink, pipeline).await;
        let sheet = CharacterSkill::new(self.text.clone(), s.character_model())
            .run(request)
            .await?;
        pipeline.advance();

        self.enter_stage(sink, pipeline).await;
        let story = StorySkill::new(self.text.clone(), s.story_model())
            .run(request, &sheet)
            .await?;
        pipeline.advance();

        self.enter_stage(sink, pipeline).await;
        let descriptions = PanelSkill::new(self.text.clone(), s.panel_model(request.panel_count()))
            .run(request, &sheet, &story)
            .await?;
        pipeline.advance();

        Ok(Script {
            sheet,
            descriptions,
        })
    }

    async fn enter_stage(&self, sink: &dyn EventSink, pipeline: &Pipeline) {
        tracing::debug!(stage = ?pipeline.stage, "entering stage");
        if let Some(step) = pipeline.stage.progress_step() {
            sink.emit(ComicEvent::progress(step)).await;
        }
    }

    /// Six caption pairs for an uploaded image.
    pub async fn generate_memes(&self, request: &MemeRequest) -> GenerationResult<Vec<MemeVariant>> {
        MemeSkill::new(self.text.clone(), self.settings.meme_model())
            .run(request)
            .await
    }
}
