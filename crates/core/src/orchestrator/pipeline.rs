//! # Pipeline Stages
//!
//! State machines for one comic request and for each of its panels.

use serde::{Deserialize, Serialize};

use super::events::ProgressStep;

/// Stage of the comic pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Designing characters and setting
    Characters,
    /// Writing the full story
    Story,
    /// Splitting the story into panel descriptions
    Panels,
    /// Rendering panel images
    Images,
    Complete,
    Failed,
}

impl PipelineStage {
    /// The `progress` step announced when entering this stage
    pub fn progress_step(&self) -> Option<ProgressStep> {
        match self {
            PipelineStage::Characters => Some(ProgressStep::Characters),
            PipelineStage::Story => Some(ProgressStep::Story),
            PipelineStage::Panels => Some(ProgressStep::Panels),
            PipelineStage::Images => Some(ProgressStep::Images),
            PipelineStage::Complete | PipelineStage::Failed => None,
        }
    }
}

/// Lifecycle of a single panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelState {
    Pending,
    Generating,
    /// A backend failed; trying fallback number `attempt`
    Retrying { attempt: u32 },
    Complete,
    Failed,
}

impl PanelState {
    pub fn start(&mut self) {
        if *self == PanelState::Pending {
            *self = PanelState::Generating;
        }
    }

    pub fn retry(&mut self) {
        *self = match *self {
            PanelState::Generating => PanelState::Retrying { attempt: 1 },
            PanelState::Retrying { attempt } => PanelState::Retrying {
                attempt: attempt + 1,
            },
            other => other,
        };
    }

    pub fn complete(&mut self) {
        if !self.is_terminal() {
            *self = PanelState::Complete;
        }
    }

    pub fn fail(&mut self) {
        if !self.is_terminal() {
            *self = PanelState::Failed;
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PanelState::Complete | PanelState::Failed)
    }
}

/// The per-request state machine
#[derive(Debug, Clone)]
pub struct Pipeline {
    pub stage: PipelineStage,
    pub panels: Vec<PanelState>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self {
            stage: PipelineStage::Characters,
            panels: Vec::new(),
        }
    }
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance to the next stage
    pub fn advance(&mut self) {
        self.stage = match self.stage {
            PipelineStage::Characters => PipelineStage::Story,
            PipelineStage::Story => PipelineStage::Panels,
            PipelineStage::Panels => PipelineStage::Images,
            PipelineStage::Images => PipelineStage::Complete,
            PipelineStage::Complete => PipelineStage::Complete,
            PipelineStage::Failed => PipelineStage::Failed,
        };
    }

    /// Enter the image stage with `count` pending panels
    pub fn begin_images(&mut self, count: usize) {
        self.stage = PipelineStage::Images;
        self.panels = vec![PanelState::Pending; count];
    }

    pub fn panel_mut(&mut self, index: usize) -> Option<&mut PanelState> {
        self.panels.get_mut(index)
    }

    pub fn completed_panels(&self) -> usize {
        self.panels
            .iter()
            .filter(|p| **p == PanelState::Complete)
            .count()
    }

    pub fn fail(&mut self) {
        self.stage = PipelineStage::Failed;
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.stage, PipelineStage::Complete | PipelineStage::Failed)
    }

    pub fn is_success(&self) -> bool {
        self.stage == PipelineStage::Complete
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_advance() {
        let mut pipeline = Pipeline::new();
        assert_eq!(pipeline.stage.progress_step(), Some(ProgressStep::Characters));

        pipeline.advance();
        pipeline.advance();
        assert_eq!(pipeline.stage, PipelineStage::Panels);

        pipeline.begin_images(2);
        assert_eq!(pipeline.panels, vec![PanelState::Pending; 2]);

        pipeline.advance();
        assert!(pipeline.is_success());
        assert_eq!(pipeline.stage.progress_step(), None);
    }

    #[test]
    fn test_failed_is_sticky() {
        let mut pipeline = Pipeline::new();
        pipeline.fail();
        pipeline.advance();
        assert!(pipeline.is_complete());
        assert!(!pipeline.is_success());
    }

    #[test]
    fn test_panel_lifecycle() {
        let mut state = PanelState::Pending;
        state.start();
        assert_eq!(state, PanelState::Generating);
        state.retry();
        state.retry();
        assert_eq!(state, PanelState::Retrying { attempt: 2 });
        state.complete();
        assert_eq!(state, PanelState::Complete);

        // terminal states do not move
        state.fail();
        state.retry();
        assert_eq!(state, PanelState::Complete);
    }
}
