//! Generated artefacts: characters, panels, comics and meme captions.

use serde::{Deserialize, Serialize};

/// A recurring character, repeated verbatim in every image prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub personality: String,
}

impl Character {
    /// Used when the character designer's output cannot be parsed.
    pub fn placeholder() -> Self {
        Self {
            name: "Main Character".to_string(),
            description: "A distinctive character with unique features".to_string(),
            personality: "determined and expressive".to_string(),
        }
    }

    /// The `name: description` form embedded in image prompts.
    pub fn consistency_line(&self) -> String {
        format!("{}: {}", self.name, self.description)
    }
}

/// Output of the character design stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterSheet {
    pub characters: Vec<Character>,
    pub setting: String,
}

impl CharacterSheet {
    pub const DEFAULT_SETTING: &'static str = "generic setting";
    pub const FALLBACK_SETTING: &'static str = "appropriate setting for the story";

    pub fn fallback() -> Self {
        Self {
            characters: vec![Character::placeholder()],
            setting: Self::FALLBACK_SETTING.to_string(),
        }
    }
}

/// One rendered cell of the comic grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Panel {
    pub url: String,
    pub description: String,
}

/// The final aggregate returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comic {
    pub panels: Vec<Panel>,
    pub grid_layout: String,
}

/// One candidate top/bottom caption pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemeVariant {
    pub top_text: String,
    pub bottom_text: String,
}

impl MemeVariant {
    /// Upper-cases both lines; absent lines become empty strings.
    pub fn normalized(top: Option<&str>, bottom: Option<&str>) -> Self {
        Self {
            top_text: top.unwrap_or_default().to_uppercase(),
            bottom_text: bottom.unwrap_or_default().to_uppercase(),
        }
    }
}
