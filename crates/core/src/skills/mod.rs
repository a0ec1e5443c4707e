//! # Panelcraft Skills
//!
//! One skill per text-model stage, plus the prompt tables and parsers they
//! share.
//!
//! ## Architecture
//!
//! ```text
//! Orchestrator
//!   └── Skills (async run over an injected TextModel)
//!         ├── prompts  (bundled templates, style and caption tables)
//!         └── parsing  (pure, tiered fallbacks)
//! ```
//!
//! **Comic stages:**
//! - `CharacterSkill` - Cast and setting (Stage 1)
//! - `StorySkill` - Full narrative (Stage 2)
//! - `PanelSkill` - Panel descriptions, always grid-sized (Stage 3)
//!
//! **Memes:**
//! - `MemeSkill` - Six caption pairs for an uploaded image

pub mod parsing;
pub mod prompts;

pub mod character_skill;
pub mod meme_skill;
pub mod panel_skill;
pub mod story_skill;

pub use character_skill::CharacterSkill;
pub use meme_skill::{MemeSkill, MEME_VARIANT_COUNT};
pub use panel_skill::PanelSkill;
pub use story_skill::StorySkill;
