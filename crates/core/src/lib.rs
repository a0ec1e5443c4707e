//! # Panelcraft Core
//!
//! The "Brain" of Panelcraft - the comic generation pipeline, provider
//! clients and the progress event protocol.
//!
//! ## Architecture
//!
//! - `domain/` - Request-scoped types (grid, styles, characters, panels)
//! - `providers/` - Text and image model seams plus OpenAI/Replicate clients
//! - `skills/` - One skill per text stage, prompt tables, tolerant parsers
//! - `orchestrator/` - Stage pipeline, panel fallback cascade, event sinks
//!
//! ## Usage
//!
//! ```rust,ignore
//! use panelcraft_core::orchestrator::{ChannelSink, Orchestrator};
//!
//! let orchestrator = Orchestrator::new(text, dalle, settings).with_alternate(flux);
//! let (sink, mut events) = ChannelSink::new(32);
//! let comic = orchestrator.run_streaming(&request, &sink).await?;
//! ```

pub mod config;
pub mod domain;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod providers;
pub mod skills;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{Credentials, GenerationSettings};
pub use error::{GenerationError, GenerationResult};
