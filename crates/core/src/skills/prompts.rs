//! Prompt templates bundled at compile time, plus the constant lookup tables
//! (art style directives, fallback meme captions) the stages draw from.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::domain::{ArtStyle, Character, MemeStyle, MemeVariant, Tone};
use crate::models::ImageBackend;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(\w+)\}\}").expect("valid regex"));

/// Character designer - characters and setting as one JSON object
pub const CHARACTER_DESIGNER: &str = include_str!("defaults/character_designer.md");

/// Storyteller - full narrative, not yet segmented
pub const STORYTELLER: &str = include_str!("defaults/storyteller.md");

/// Panel designer - splits the story into a JSON array of panel descriptions
pub const PANEL_DESIGNER: &str = include_str!("defaults/panel_designer.md");

/// Primary single-panel image prompt (DALL-E 3)
pub const PANEL_IMAGE: &str = include_str!("defaults/panel_image.md");

/// Reference-conditioned image prompt (flux-kontext-max)
pub const REFERENCE_PANEL_IMAGE: &str = include_str!("defaults/reference_panel_image.md");

/// Meme creator - vision prompt returning caption pairs
pub const MEME_CREATOR: &str = include_str!("defaults/meme_creator.md");

/// All bundled templates with their slugs
pub fn all_defaults() -> Vec<(&'static str, &'static str)> {
    vec![
        ("character_designer", CHARACTER_DESIGNER),
        ("storyteller", STORYTELLER),
        ("panel_designer", PANEL_DESIGNER),
        ("panel_image", PANEL_IMAGE),
        ("reference_panel_image", REFERENCE_PANEL_IMAGE),
        ("meme_creator", MEME_CREATOR),
    ]
}

/// Substitute `{{name}}` placeholders in a single pass, so substituted
/// values are never expanded again. Unknown placeholders are left as-is.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    PLACEHOLDER
        .replace_all(template.trim(), |caps: &Captures| {
            vars.iter()
                .find(|(name, _)| *name == &caps[1])
                .map(|(_, value)| value.to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Art style -> image style directive. `Cartoon` doubles as the default branch.
pub const STYLE_DIRECTIVES: [(ArtStyle, &str); 8] = [
    (
        ArtStyle::Manga,
        "Manga-style comic panel with clean line art, dramatic expressions, and manga visual effects",
    ),
    (
        ArtStyle::Superhero,
        "Superhero comic panel with bold lines, dynamic poses, and vibrant colors in classic comic book style",
    ),
    (
        ArtStyle::Cyberpunk,
        "Cyberpunk comic panel with neon colors, futuristic technology, and dark urban atmosphere",
    ),
    (
        ArtStyle::Watercolor,
        "Watercolor comic panel with soft, flowing colors and artistic brush strokes",
    ),
    (
        ArtStyle::Noir,
        "Film noir comic panel with high contrast, dramatic shadows, and monochromatic tones",
    ),
    (
        ArtStyle::PixelArt,
        "Pixel art comic panel with retro 8-bit or 16-bit video game aesthetics",
    ),
    (
        ArtStyle::Disney,
        "Disney animation style comic panel with expressive characters and bright, cheerful colors",
    ),
    (
        ArtStyle::Cartoon,
        "Cartoon comic panel with bright colors, expressive characters, and clean line art",
    ),
];

const DEFAULT_STYLE_DIRECTIVE: &str =
    "Cartoon comic panel with bright colors, expressive characters, and clean line art";

pub fn style_directive(style: ArtStyle) -> &'static str {
    STYLE_DIRECTIVES
        .iter()
        .find(|(s, _)| *s == style)
        .map(|(_, directive)| *directive)
        .unwrap_or(DEFAULT_STYLE_DIRECTIVE)
}

/// Every character as `name: description`, joined with `". "`.
pub fn character_clause(characters: &[Character]) -> String {
    characters
        .iter()
        .map(Character::consistency_line)
        .collect::<Vec<_>>()
        .join(". ")
}

fn characters_json(characters: &[Character]) -> String {
    serde_json::to_string(characters).unwrap_or_default()
}

pub fn character_system_prompt(prompt: &str, panel_count: usize, art_style: ArtStyle, tone: Tone) -> String {
    render(
        CHARACTER_DESIGNER,
        &[
            ("prompt", prompt),
            ("panel_count", &panel_count.to_string()),
            ("art_style", art_style.as_str()),
            ("tone", tone.as_str()),
        ],
    )
}

pub fn character_user_prompt(prompt: &str) -> String {
    format!("Create character descriptions for a comic about: {}", prompt)
}

pub fn story_system_prompt(
    prompt: &str,
    characters: &[Character],
    setting: &str,
    tone: Tone,
    panel_count: usize,
) -> String {
    render(
        STORYTELLER,
        &[
            ("prompt", prompt),
            ("characters", &characters_json(characters)),
            ("setting", setting),
            ("tone", tone.as_str()),
            ("panel_count", &panel_count.to_string()),
        ],
    )
}

pub fn story_user_prompt(prompt: &str) -> String {
    format!("Write a complete story about: {}", prompt)
}

pub fn panel_system_prompt(
    story: &str,
    characters: &[Character],
    setting: &str,
    panel_count: usize,
) -> String {
    render(
        PANEL_DESIGNER,
        &[
            ("panel_count", &panel_count.to_string()),
            ("story", story),
            ("characters", &characters_json(characters)),
            ("setting", setting),
        ],
    )
}

pub fn panel_user_prompt(panel_count: usize) -> String {
    format!("Break this story into {} panels", panel_count)
}

/// Inputs shared by every image prompt for one panel.
#[derive(Debug, Clone, Copy)]
pub struct PanelPrompt<'a> {
    pub art_style: ArtStyle,
    pub tone: Tone,
    pub description: &'a str,
    pub characters: &'a str,
}

impl PanelPrompt<'_> {
    /// Full single-panel prompt with negative multi-panel constraints.
    pub fn primary(&self) -> String {
        render(
            PANEL_IMAGE,
            &[
                ("style", style_directive(self.art_style)),
                ("description", self.description),
                ("characters", self.characters),
                ("tone", self.tone.as_str()),
            ],
        )
    }

    pub fn reference(&self) -> String {
        render(
            REFERENCE_PANEL_IMAGE,
            &[
                ("style", style_directive(self.art_style)),
                ("description", self.description),
                ("characters", self.characters),
                ("tone", self.tone.as_str()),
            ],
        )
    }

    pub fn flux_dev(&self) -> String {
        format!(
            "{}: {}. CHARACTER CONSISTENCY: {}. Style: {}",
            style_directive(self.art_style),
            self.description,
            self.characters,
            self.tone
        )
    }

    pub fn schnell(&self) -> String {
        format!(
            "{}: {}. CHARACTER: {}. {} mood",
            style_directive(self.art_style),
            self.description,
            self.characters,
            self.tone
        )
    }

    pub fn for_backend(&self, backend: ImageBackend) -> String {
        match backend {
            ImageBackend::DallE3 => self.primary(),
            ImageBackend::FluxKontextMax => self.reference(),
            ImageBackend::FluxDev => self.flux_dev(),
            ImageBackend::FluxSchnell => self.schnell(),
        }
    }
}

pub fn meme_system_prompt(style: MemeStyle, custom_prompt: &str) -> String {
    let context = if custom_prompt.is_empty() {
        String::new()
    } else {
        format!("Additional context: {}", custom_prompt)
    };
    render(
        MEME_CREATOR,
        &[("style", style.as_str()), ("context", &context)],
    )
}

pub fn meme_user_prompt(style: MemeStyle, custom_prompt: &str) -> String {
    let hint = if custom_prompt.is_empty() {
        "Be creative and funny!".to_string()
    } else {
        format!("Context: {}", custom_prompt)
    };
    format!("Create {} memes for this image. {}", style, hint)
}

type CaptionSet = [(&'static str, &'static str); 6];

const FUNNY_CAPTIONS: CaptionSet = [
    ("WHEN LIFE GIVES YOU LEMONS", "MAKE MEMES"),
    ("ME PRETENDING TO UNDERSTAND", "WHAT'S HAPPENING"),
    ("THAT AWKWARD MOMENT", "WHEN YOU EXIST"),
    ("EXPECTATIONS", "VS REALITY"),
    ("THAT FACE WHEN", "YOU REMEMBER IT'S MONDAY"),
    ("I CAME, I SAW", "I MADE IT AWKWARD"),
];

const SARCASTIC_CAPTIONS: CaptionSet = [
    ("OH GREAT", "ANOTHER MONDAY"),
    ("I'M FINE", "EVERYTHING IS FINE"),
    ("SURE, I'D LOVE TO", "DO MORE WORK"),
    ("WOW", "WHAT A SURPRISE"),
    ("THANKS FOR THE ADVICE", "SAID NO ONE EVER"),
    ("YES PLEASE", "TELL ME MORE"),
];

const RELATABLE_CAPTIONS: CaptionSet = [
    ("ME WHEN I HAVE", "0 UNREAD MESSAGES"),
    ("TRYING TO LOOK BUSY", "WHEN THE BOSS WALKS BY"),
    ("ME VS MY RESPONSIBILITIES", ""),
    ("ME AT 3AM", "THINKING ABOUT THAT ONE THING"),
    ("WHEN THE WIFI", "DROPS FOR ONE SECOND"),
    ("MY BRAIN", "DURING THE EXAM"),
];

/// Used when the model answers with an empty caption list.
const GENERIC_CAPTIONS: CaptionSet = [
    ("WHEN AI FAILS", "BUT YOU STILL GET MEMES"),
    ("THIS IMAGE IS", "MEME WORTHY"),
    ("ERROR 404", "CREATIVITY NOT FOUND"),
    ("WHEN THE CAPTION", "WRITES ITSELF"),
    ("NO WORDS", "JUST VIBES"),
    ("PLOT TWIST", "THERE IS NO PLOT"),
];

/// Meme style -> dedicated fallback captions. Styles without an entry use funny.
pub const FALLBACK_CAPTIONS: [(MemeStyle, CaptionSet); 3] = [
    (MemeStyle::Funny, FUNNY_CAPTIONS),
    (MemeStyle::Sarcastic, SARCASTIC_CAPTIONS),
    (MemeStyle::Relatable, RELATABLE_CAPTIONS),
];

fn to_variants(set: &CaptionSet) -> Vec<MemeVariant> {
    set.iter()
        .map(|&(top, bottom)| MemeVariant::normalized(Some(top), Some(bottom)))
        .collect()
}

pub fn fallback_captions(style: MemeStyle) -> Vec<MemeVariant> {
    to_variants(
        FALLBACK_CAPTIONS
            .iter()
            .find(|(s, _)| *s == style)
            .map(|(_, set)| set)
            .unwrap_or(&FUNNY_CAPTIONS),
    )
}

pub fn generic_captions() -> Vec<MemeVariant> {
    to_variants(&GENERIC_CAPTIONS)
}
