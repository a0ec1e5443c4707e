//! # Comic Events
//!
//! The progress vocabulary streamed to clients. Each event has a wire name
//! and a camelCase JSON payload.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{Comic, GridSize, Panel};

/// Which text/image stage a `progress` event announces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStep {
    Characters,
    Story,
    Panels,
    Images,
}

impl ProgressStep {
    pub fn message(&self) -> &'static str {
        match self {
            ProgressStep::Characters => "Creating character descriptions...",
            ProgressStep::Story => "Writing the story...",
            ProgressStep::Panels => "Breaking story into panels...",
            ProgressStep::Images => "Starting image generation...",
        }
    }
}

/// An event in the comic stream
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged, rename_all_fields = "camelCase")]
pub enum ComicEvent {
    /// Before Stage 1
    Start {
        message: String,
        total_panels: usize,
        grid_size: String,
    },
    /// Before each of Stages 1-4
    Progress { message: String, step: ProgressStep },
    PanelStart {
        panel_index: usize,
        message: String,
        description: String,
    },
    /// Panel rendered, by whichever backend succeeded
    PanelComplete {
        panel_index: usize,
        panel: Panel,
        message: String,
    },
    /// A backend failed and a fallback is about to be tried
    PanelError { panel_index: usize, message: String },
    /// Every fallback exhausted; precedes `Error`
    PanelFailed { panel_index: usize, message: String },
    Complete {
        panels: Vec<Panel>,
        grid_layout: String,
        message: String,
    },
    Error { message: String, error: String },
}

impl ComicEvent {
    pub fn start(total_panels: usize, grid: GridSize) -> Self {
        Self::Start {
            message: "Starting comic generation...".to_string(),
            total_panels,
            grid_size: grid.to_string(),
        }
    }

    pub fn progress(step: ProgressStep) -> Self {
        Self::Progress {
            message: step.message().to_string(),
            step,
        }
    }

    pub fn panel_start(panel_index: usize, total: usize, description: &str) -> Self {
        Self::PanelStart {
            panel_index,
            message: format!("Generating panel {}/{}...", panel_index + 1, total),
            description: description.to_string(),
        }
    }

    pub fn panel_complete(panel_index: usize, panel: Panel, message: String) -> Self {
        Self::PanelComplete {
            panel_index,
            panel,
            message,
        }
    }

    pub fn panel_error(panel_index: usize, message: String) -> Self {
        Self::PanelError {
            panel_index,
            message,
        }
    }

    pub fn panel_failed(panel_index: usize) -> Self {
        Self::PanelFailed {
            panel_index,
            message: format!("Failed to generate panel {}", panel_index + 1),
        }
    }

    pub fn complete(comic: &Comic) -> Self {
        Self::Complete {
            panels: comic.panels.clone(),
            grid_layout: comic.grid_layout.clone(),
            message: "Comic generation completed!".to_string(),
        }
    }

    pub fn error(error: impl std::fmt::Display) -> Self {
        Self::Error {
            message: "Failed to generate comic".to_string(),
            error: error.to_string(),
        }
    }

    /// Wire name (`event:` field of the stream).
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start { .. } => "start",
            Self::Progress { .. } => "progress",
            Self::PanelStart { .. } => "panel-start",
            Self::PanelComplete { .. } => "panel-complete",
            Self::PanelError { .. } => "panel-error",
            Self::PanelFailed { .. } => "panel-failed",
            Self::Complete { .. } => "complete",
            Self::Error { .. } => "error",
        }
    }

    pub fn payload(&self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }

    /// `complete` or `error`
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete { .. } | Self::Error { .. })
    }

    /// Text/event-stream frame: `event: <name>\ndata: <json>\n\n`.
    pub fn to_frame(&self) -> String {
        format!("event: {}\ndata: {}\n\n", self.name(), self.payload())
    }
}
