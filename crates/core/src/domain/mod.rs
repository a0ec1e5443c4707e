//! # Domain
//!
//! Request-scoped entities. Nothing here outlives a single HTTP request.

pub mod comic;
pub mod request;

pub use comic::{Character, CharacterSheet, Comic, MemeVariant, Panel};
pub use request::{ArtStyle, GenerationRequest, GridSize, MemeRequest, MemeStyle, Tone};
