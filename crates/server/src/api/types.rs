//! Request and response bodies for the HTTP API.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use panelcraft_core::domain::{
    ArtStyle, Comic, GenerationRequest, GridSize, MemeRequest, MemeStyle, MemeVariant, Panel, Tone,
};
use panelcraft_core::GenerationResult;

/// Body of both comic endpoints
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComicRequestBody {
    /// What the comic is about
    pub prompt: Option<String>,
    /// `<rows>x<cols>`, default `2x2`
    pub grid_size: Option<String>,
    /// Default `cartoon`; unknown values fall back to it
    pub art_style: Option<String>,
    /// Default `funny`; unknown values fall back to it
    pub tone: Option<String>,
}

impl ComicRequestBody {
    pub fn into_request(self) -> GenerationResult<GenerationRequest> {
        let grid = match self.grid_size.as_deref() {
            Some(grid) => GridSize::parse(grid)?,
            None => GridSize::default(),
        };

        GenerationRequest::new(
            self.prompt.as_deref().unwrap_or_default(),
            grid,
            self.art_style
                .as_deref()
                .map(ArtStyle::from_key)
                .unwrap_or_default(),
            self.tone.as_deref().map(Tone::from_key).unwrap_or_default(),
        )
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PanelDto {
    pub url: String,
    pub description: String,
}

impl From<Panel> for PanelDto {
    fn from(panel: Panel) -> Self {
        Self {
            url: panel.url,
            description: panel.description,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComicResponse {
    pub panels: Vec<PanelDto>,
    pub grid_layout: String,
}

impl From<Comic> for ComicResponse {
    fn from(comic: Comic) -> Self {
        Self {
            panels: comic.panels.into_iter().map(PanelDto::from).collect(),
            grid_layout: comic.grid_layout,
        }
    }
}

/// Body of the meme endpoint
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemeRequestBody {
    /// Image as a data URL
    pub image_data: Option<String>,
    /// Default `funny`
    pub style: Option<String>,
    /// Optional extra direction for the captions
    pub custom_prompt: Option<String>,
}

impl MemeRequestBody {
    pub fn into_request(self) -> GenerationResult<MemeRequest> {
        MemeRequest::new(
            self.image_data.as_deref().unwrap_or_default(),
            self.style
                .as_deref()
                .map(MemeStyle::from_key)
                .unwrap_or_default(),
            self.custom_prompt.as_deref().unwrap_or_default(),
        )
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemeTextDto {
    pub top_text: String,
    pub bottom_text: String,
}

impl From<MemeVariant> for MemeTextDto {
    fn from(variant: MemeVariant) -> Self {
        Self {
            top_text: variant.top_text,
            bottom_text: variant.bottom_text,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemeResponse {
    pub meme_texts: Vec<MemeTextDto>,
    pub style: String,
    pub message: String,
}

impl MemeResponse {
    pub const SUCCESS_MESSAGE: &'static str = "Meme texts generated successfully!";

    pub fn new(variants: Vec<MemeVariant>, style: MemeStyle) -> Self {
        Self {
            meme_texts: variants.into_iter().map(MemeTextDto::from).collect(),
            style: style.as_str().to_string(),
            message: Self::SUCCESS_MESSAGE.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub openai_configured: bool,
    pub replicate_configured: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comic_body_defaults() {
        let body: ComicRequestBody = serde_json::from_str(r#"{"prompt": "a cat"}"#).unwrap();
        let request = body.into_request().unwrap();
        assert_eq!(request.grid, GridSize::default());
        assert_eq!(request.art_style, ArtStyle::default());
        assert_eq!(request.tone, Tone::default());
    }

    #[test]
    fn test_comic_body_camel_case() {
        let body: ComicRequestBody = serde_json::from_str(
            r#"{"prompt": "a cat", "gridSize": "1x3", "artStyle": "manga", "tone": "nope"}"#,
        )
        .unwrap();
        let request = body.into_request().unwrap();
        assert_eq!(request.panel_count(), 3);
        assert_eq!(request.art_style.as_str(), "manga");
        assert_eq!(request.tone, Tone::default());
    }

    #[test]
    fn test_comic_body_rejects_bad_grid_and_prompt() {
        let body = ComicRequestBody {
            prompt: Some("a cat".into()),
            grid_size: Some("2by2".into()),
            ..Default::default()
        };
        assert!(body.into_request().unwrap_err().is_client_error());
        assert!(ComicRequestBody::default().into_request().is_err());
    }

    #[test]
    fn test_meme_response_shape() {
        let response = MemeResponse::new(
            vec![MemeVariant::normalized(Some("top"), None)],
            MemeStyle::default(),
        );
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["memeTexts"][0]["topText"], "TOP");
        assert_eq!(json["memeTexts"][0]["bottomText"], "");
        assert_eq!(json["message"], "Meme texts generated successfully!");
    }
}
