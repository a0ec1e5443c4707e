//! # Orchestrator
//!
//! The comic pipeline and its progress protocol.
//!
//! ## Architecture
//!
//! - `coordinator` - Runs the stages (`Orchestrator`)
//! - `fallback` - Per-panel image backend cascade
//! - `events` - Event vocabulary streamed to clients
//! - `sink` - Where events go (`ChannelSink`, `NullSink`)
//! - `pipeline` - Stage and panel state machines
//! - `retry` - Linear backoff for the batch variant

pub mod coordinator;
pub mod events;
pub mod fallback;
pub mod pipeline;
pub mod retry;
pub mod sink;

pub use coordinator::Orchestrator;
pub use events::{ComicEvent, ProgressStep};
pub use fallback::{PanelRenderer, RenderedPanel};
pub use pipeline::{PanelState, Pipeline, PipelineStage};
pub use retry::retry_with_backoff;
pub use sink::{ChannelSink, EventSink, NullSink};
