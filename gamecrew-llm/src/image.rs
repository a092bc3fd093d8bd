//! Image generation client
//!
//! Wraps the OpenAI images endpoint (`POST /images/generations`) and returns
//! decoded PNG bytes. Saving to disk is left to the caller.

use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::provider::{ProviderConfig, ProviderError};

pub const DEFAULT_IMAGE_MODEL: &str = "dall-e-3";
pub const DEFAULT_STYLE: &str = "digital art";
pub const DEFAULT_ASPECT_RATIO: &str = "1:1";

/// Supported aspect ratios and the pixel sizes the endpoint accepts for them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AspectRatio {
    #[default]
    Square,
    Wide,
    Landscape,
    Portrait,
    Tall,
}

impl AspectRatio {
    /// Unknown ratios fall back to square.
    pub fn parse(ratio: &str) -> Self {
        match ratio.trim() {
            "16:9" => AspectRatio::Wide,
            "4:3" => AspectRatio::Landscape,
            "3:4" => AspectRatio::Portrait,
            "9:16" => AspectRatio::Tall,
            _ => AspectRatio::Square,
        }
    }

    pub fn size(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1024x1024",
            AspectRatio::Wide => "1792x1024",
            AspectRatio::Landscape => "1024x768",
            AspectRatio::Portrait => "768x1024",
            AspectRatio::Tall => "1024x1792",
        }
    }
}

/// One image to generate
#[derive(Debug, Clone)]
pub struct ImageRequest {
    pub prompt: String,
    pub style: String,
    pub aspect_ratio: AspectRatio,
}

impl ImageRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            style: DEFAULT_STYLE.to_string(),
            aspect_ratio: AspectRatio::default(),
        }
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: AspectRatio) -> Self {
        self.aspect_ratio = aspect_ratio;
        self
    }

    /// Prompt as sent to the endpoint, with style and asset hints appended
    pub fn enhanced_prompt(&self) -> String {
        format!("{}, {}, high quality, game asset", self.prompt, self.style)
    }
}

pub struct ImageClient {
    client: Client,
    config: ProviderConfig,
    model: String,
}

impl ImageClient {
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        let client = config.http_client()?;
        Ok(Self {
            client,
            config,
            model: DEFAULT_IMAGE_MODEL.to_string(),
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Generate one image and return its PNG bytes
    pub async fn generate(&self, request: &ImageRequest) -> Result<Vec<u8>, ProviderError> {
        let body = ImagesRequest {
            model: &self.model,
            prompt: request.enhanced_prompt(),
            n: 1,
            size: request.aspect_ratio.size(),
            response_format: "b64_json",
        };

        tracing::debug!(model = %self.model, size = body.size, "requesting image");

        let req = self
            .client
            .post(format!("{}/images/generations", self.config.base_url()))
            .json(&body);

        let response = self
            .config
            .authorize(req)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ProviderError::from_response(response).await);
        }

        let images: ImagesResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        let encoded = images
            .data
            .into_iter()
            .next()
            .and_then(|image| image.b64_json)
            .ok_or_else(|| ProviderError::Other("No image data in response".into()))?;

        base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| ProviderError::Parse(format!("invalid base64 image data: {}", e)))
    }
}

#[derive(Debug, Serialize)]
struct ImagesRequest<'a> {
    model: &'a str,
    prompt: String,
    n: u32,
    size: &'static str,
    response_format: &'static str,
}

#[derive(Debug, Deserialize)]
struct ImagesResponse {
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    b64_json: Option<String>,
}
