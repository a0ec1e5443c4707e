//! Request-scoped inputs: grid layout, art style, tone and meme style.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GenerationError;

/// Rows x columns of the comic grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSize {
    pub rows: usize,
    pub cols: usize,
}

impl GridSize {
    /// Largest grid accepted from callers.
    pub const MAX_PANELS: usize = 16;

    /// Parse a `"<rows>x<cols>"` string. Both parts must be positive integers
    /// and the grid may hold at most [`Self::MAX_PANELS`] panels.
    pub fn parse(value: &str) -> Result<Self, GenerationError> {
        let invalid = || {
            GenerationError::Validation(format!(
                "Invalid grid size '{}': expected <rows>x<cols>",
                value
            ))
        };

        let (rows, cols) = value
            .trim()
            .split_once(|c: char| c == 'x' || c == 'X')
            .ok_or_else(invalid)?;
        let rows: usize = rows.trim().parse().map_err(|_| invalid())?;
        let cols: usize = cols.trim().parse().map_err(|_| invalid())?;

        if rows == 0 || cols == 0 {
            return Err(invalid());
        }

        match rows.checked_mul(cols) {
            Some(count) if count <= Self::MAX_PANELS => Ok(Self { rows, cols }),
            _ => Err(GenerationError::Validation(format!(
                "Invalid grid size '{}': at most {} panels allowed",
                value,
                Self::MAX_PANELS
            ))),
        }
    }

    pub fn panel_count(&self) -> usize {
        self.rows.saturating_mul(self.cols)
    }
}

impl Default for GridSize {
    fn default() -> Self {
        Self { rows: 2, cols: 2 }
    }
}

impl fmt::Display for GridSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

impl FromStr for GridSize {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Defines a lenient wire enum: unknown keys fall back to the default variant.
macro_rules! keyed_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            default: $default:ident => $default_key:literal,
            $($variant:ident => $key:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            #[default]
            $default,
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$name::$default, $($name::$variant),+];

            /// Canonical wire key.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $name::$default => $default_key,
                    $($name::$variant => $key),+
                }
            }

            /// Lenient lookup; anything unrecognised maps to the default.
            pub fn from_key(key: &str) -> Self {
                let key = key.trim().to_ascii_lowercase();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == key)
                    .unwrap_or_default()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

keyed_enum! {
    /// Visual style of every panel.
    ArtStyle {
        default: Cartoon => "cartoon",
        Manga => "manga",
        Superhero => "superhero",
        Cyberpunk => "cyberpunk",
        Watercolor => "watercolor",
        Noir => "noir",
        PixelArt => "pixelart",
        Disney => "disney",
    }
}

keyed_enum! {
    /// Narrative tone of a comic.
    Tone {
        default: Funny => "funny",
        Dramatic => "dramatic",
        Mysterious => "mysterious",
        Romantic => "romantic",
        Action => "action",
        Horror => "horror",
        Wholesome => "wholesome",
        Satirical => "satirical",
    }
}

keyed_enum! {
    /// Humor register for meme captions.
    MemeStyle {
        default: Funny => "funny",
        Sarcastic => "sarcastic",
        Wholesome => "wholesome",
        Relatable => "relatable",
        Absurd => "absurd",
        Motivational => "motivational",
        Roast => "roast",
        Nostalgic => "nostalgic",
    }
}

/// A validated comic generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub grid: GridSize,
    pub art_style: ArtStyle,
    pub tone: Tone,
}

impl GenerationRequest {
    pub fn new(
        prompt: &str,
        grid: GridSize,
        art_style: ArtStyle,
        tone: Tone,
    ) -> Result<Self, GenerationError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(GenerationError::Validation("Prompt is required".to_string()));
        }

        Ok(Self {
            prompt: prompt.to_string(),
            grid,
            art_style,
            tone,
        })
    }

    pub fn panel_count(&self) -> usize {
        self.grid.panel_count()
    }
}

/// A validated meme caption request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemeRequest {
    /// Inline image as a data URL.
    pub image_data: String,
    pub style: MemeStyle,
    pub custom_prompt: String,
}

impl MemeRequest {
    pub fn new(
        image_data: &str,
        style: MemeStyle,
        custom_prompt: &str,
    ) -> Result<Self, GenerationError> {
        if image_data.trim().is_empty() {
            return Err(GenerationError::Validation("Image data is required".to_string()));
        }

        Ok(Self {
            image_data: image_data.to_string(),
            style,
            custom_prompt: custom_prompt.trim().to_string(),
        })
    }
}
