//! # Parsing
//!
//! Best-effort extraction of structured data from free-text model output.
//! Every function here is pure; the stages decide what to do on `Err`.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::domain::{Character, CharacterSheet, MemeVariant};

static PANEL_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Panel \d+").expect("valid regex"));

const STORY_STAGES: [&str; 4] = ["beginning", "development", "climax", "conclusion"];

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("no JSON array found in model output")]
    NoJsonArray,

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a JSON object")]
    NotAnObject,

    #[error("no usable characters in mainCharacters")]
    NoCharacters,

    #[error("no panel descriptions found")]
    NoPanels,

    #[error("model returned an empty list")]
    Empty,
}

/// Remove Markdown code fences (with or without a `json` tag) and trim.
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json\n", "")
        .replace("```json", "")
        .replace("```\n", "")
        .replace("```", "")
        .trim()
        .to_string()
}

/// Greedy slice from the first `[` to the last `]`.
pub fn extract_json_array(text: &str) -> Result<&str, ParseError> {
    let start = text.find('[').ok_or(ParseError::NoJsonArray)?;
    let end = text.rfind(']').ok_or(ParseError::NoJsonArray)?;
    if end < start {
        return Err(ParseError::NoJsonArray);
    }
    Ok(&text[start..=end])
}

/// Parse the character designer's `{ mainCharacters, setting }` object.
/// At least one character must survive, otherwise the caller substitutes
/// the placeholder cast.
pub fn parse_character_sheet(text: &str) -> Result<CharacterSheet, ParseError> {
    let cleaned = strip_code_fences(text);
    let value: Value = serde_json::from_str(&cleaned)?;
    let object = value.as_object().ok_or(ParseError::NotAnObject)?;

    let characters: Vec<Character> = object
        .get("mainCharacters")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter(|item| item.is_object())
                .filter_map(|item| serde_json::from_value::<Character>(item.clone()).ok())
                .collect()
        })
        .unwrap_or_default();
    if characters.is_empty() {
        return Err(ParseError::NoCharacters);
    }

    let setting = object
        .get("setting")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(CharacterSheet::DEFAULT_SETTING)
        .to_string();

    Ok(CharacterSheet { characters, setting })
}

/// Tier 1: JSON array of strings. Tier 2: split on `Panel <n>` markers.
pub fn parse_panel_descriptions(text: &str) -> Result<Vec<String>, ParseError> {
    let cleaned = strip_code_fences(text);

    if let Ok(array) = extract_json_array(&cleaned) {
        match serde_json::from_str::<Vec<Value>>(array) {
            Ok(items) if !items.is_empty() => {
                return Ok(items
                    .into_iter()
                    .map(|item| match item {
                        Value::String(s) => s,
                        other => other.to_string(),
                    })
                    .collect());
            }
            Ok(_) => tracing::debug!("panel array was empty, trying panel markers"),
            Err(e) => tracing::debug!(error = %e, "panel array did not parse, trying panel markers"),
        }
    }

    let segments: Vec<String> = PANEL_MARKER
        .split(&cleaned)
        .skip(1)
        .enumerate()
        .map(|(i, segment)| format!("Panel {}{}", i + 1, segment.trim()))
        .collect();

    if segments.is_empty() {
        return Err(ParseError::NoPanels);
    }
    Ok(segments)
}

/// Deterministic placeholder for panel `index` (0-based).
pub fn fallback_panel_description(prompt: &str, index: usize) -> String {
    let stage = STORY_STAGES[index.min(STORY_STAGES.len() - 1)];
    let dialogue = match stage {
        "climax" => "Oh no!",
        "conclusion" => "All done!",
        _ => "Here we go!",
    };
    format!(
        "Panel {}: {} - {} scene. Speech bubble: \"{}\"",
        index + 1,
        prompt,
        stage,
        dialogue
    )
}

pub fn fallback_panel_descriptions(prompt: &str, count: usize) -> Vec<String> {
    (0..count)
        .map(|i| fallback_panel_description(prompt, i))
        .collect()
}

/// Force exactly `count` descriptions: extras are dropped, gaps are filled
/// with the placeholder for that index.
pub fn fit_panel_count(mut descriptions: Vec<String>, prompt: &str, count: usize) -> Vec<String> {
    descriptions.truncate(count);
    while descriptions.len() < count {
        let index = descriptions.len();
        descriptions.push(fallback_panel_description(prompt, index));
    }
    descriptions
}

/// Parse `[{"topText": .., "bottomText": ..}, ..]` into upper-cased variants.
pub fn parse_meme_captions(text: &str) -> Result<Vec<MemeVariant>, ParseError> {
    let cleaned = strip_code_fences(text);
    let array = extract_json_array(&cleaned)?;
    let items: Vec<Value> = serde_json::from_str(array)?;
    if items.is_empty() {
        return Err(ParseError::Empty);
    }

    Ok(items
        .iter()
        .map(|item| {
            let top = caption_field(item, "topText");
            let bottom = caption_field(item, "bottomText");
            MemeVariant::normalized(top.as_deref(), bottom.as_deref())
        })
        .collect())
}

fn caption_field(item: &Value, key: &str) -> Option<String> {
    match item.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}
