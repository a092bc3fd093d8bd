//! Tools agents can call during a task.
//!
//! Tool failures are reported back to the model as text; only malformed
//! arguments surface as errors, and the agent loop turns those into text too.

use async_trait::async_trait;
use gamecrew_error::{Error, Result};
use gamecrew_llm::{AspectRatio, ImageClient, ImageRequest, ProviderConfig, ToolDefinition};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[async_trait]
pub trait Tool: Send + Sync {
    /// Function name exposed to the model
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON schema of the arguments object
    fn parameters(&self) -> serde_json::Value;

    /// Run the tool with the model-supplied JSON arguments
    async fn call(&self, arguments: &str) -> Result<String>;

    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(self.name(), self.description()).with_parameters(self.parameters())
    }
}

/// Tools available to a crew, looked up by the names used in `agents.yaml`
#[derive(Default, Clone)]
pub struct ToolSet {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, tool: impl Tool + 'static) -> Self {
        self.insert(Arc::new(tool));
        self
    }

    pub fn insert(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.tools.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

// =============================================================================
// Image generation
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ImageGenerationArgs {
    /// Detailed description of the image
    pub prompt: String,
    /// File name to save under, without extension
    pub filename: String,
    #[serde(default = "default_style")]
    pub style: String,
    #[serde(default = "default_aspect_ratio")]
    pub aspect_ratio: String,
}

fn default_style() -> String {
    gamecrew_llm::image::DEFAULT_STYLE.to_string()
}

fn default_aspect_ratio() -> String {
    gamecrew_llm::image::DEFAULT_ASPECT_RATIO.to_string()
}

/// Generates game art and saves it as `<images_dir>/<filename>.png`
pub struct ImageGenerationTool {
    client: ImageClient,
    images_dir: PathBuf,
}

impl ImageGenerationTool {
    pub const NAME: &'static str = "image_generation";

    pub fn new(config: ProviderConfig, images_dir: impl Into<PathBuf>) -> Result<Self> {
        if !config.has_api_key() {
            return Err(Error::config_invalid("API key is required for image generation.")
                .with_operation("image_tool::new"));
        }

        let images_dir = images_dir.into();
        std::fs::create_dir_all(&images_dir).map_err(|e| {
            Error::from(e)
                .with_operation("image_tool::new")
                .with_context("dir", images_dir.display().to_string())
        })?;

        let client = ImageClient::new(config)?;
        Ok(Self { client, images_dir })
    }

    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }

    /// Generate and save one image, describing the outcome as text
    pub async fn generate(&self, args: &ImageGenerationArgs) -> String {
        match self.try_generate(args).await {
            Ok(path) => format!("Image successfully generated and saved to {}", path.display()),
            Err(e) => {
                tracing::warn!(filename = %args.filename, error = %e, "image generation failed");
                format!("Error generating image: {}", e.message())
            }
        }
    }

    async fn try_generate(&self, args: &ImageGenerationArgs) -> Result<PathBuf> {
        let request = ImageRequest::new(&args.prompt)
            .with_style(&args.style)
            .with_aspect_ratio(AspectRatio::parse(&args.aspect_ratio));

        let bytes = self.client.generate(&request).await.map_err(Error::from)?;

        let path = self.images_dir.join(format!("{}.png", sanitize_filename(&args.filename)));
        tokio::fs::write(&path, &bytes).await.map_err(|e| {
            Error::from(e)
                .with_operation("image_tool::save")
                .with_context("path", path.display().to_string())
        })?;

        tracing::info!(path = %path.display(), bytes = bytes.len(), "saved image");
        Ok(path)
    }
}

#[async_trait]
impl Tool for ImageGenerationTool {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Generates images using the DALL-E API based on detailed text prompts. \
         The tool creates images for game elements like backgrounds, characters, and UI components."
    }

    fn parameters(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "prompt": {
                    "type": "string",
                    "description": "Detailed description of the image to generate."
                },
                "filename": {
                    "type": "string",
                    "description": "Filename to save the generated image (without extension)."
                },
                "style": {
                    "type": "string",
                    "description": "Style of the image (e.g., digital art, photo, cartoon)."
                },
                "aspect_ratio": {
                    "type": "string",
                    "description": "Aspect ratio of the image (e.g., '1:1', '16:9', '4:3')."
                }
            },
            "required": ["prompt", "filename"]
        })
    }

    async fn call(&self, arguments: &str) -> Result<String> {
        let args: ImageGenerationArgs = serde_json::from_str(arguments).map_err(|e| {
            Error::invalid_argument(format!("invalid image_generation arguments: {}", e))
                .with_operation("image_tool::call")
        })?;
        Ok(self.generate(&args).await)
    }
}

/// Reduce a model-chosen name to one safe path component
pub fn sanitize_filename(name: &str) -> String {
    let name = name.trim();
    let name = name.strip_suffix(".png").unwrap_or(name);
    let safe = name
        .replace(['/', '\\', ':', '*', '?', '"', '<', '>', '|'], "_")
        .trim_start_matches('.')
        .to_string();

    if safe.is_empty() {
        "image".to_string()
    } else {
        safe
    }
}
