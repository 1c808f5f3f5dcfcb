//! Image generation: a stateless one-shot request, no conversation state.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::Config;
use crate::gateway::GatewayError;

/// A single generation call. Empty option fields are omitted upstream.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageRequest {
    /// Model driving the generation tool.
    pub model: String,
    /// What to draw.
    pub prompt: String,
    /// Requested output size, may be empty.
    pub size: String,
    /// Requested quality tier, may be empty.
    pub quality: String,
    /// Requested output format, may be empty.
    pub format: String,
    /// Requested background treatment, may be empty.
    pub background: String,
}

/// A generated image.
#[derive(Clone, Debug)]
pub struct GeneratedImage {
    /// Raw image bytes.
    pub data: Vec<u8>,
    /// Format the bytes are in.
    pub format: String,
}

/// Stateless gateway performing exactly one generation call per invocation.
#[async_trait]
pub trait ImageClient: Send + Sync {
    /// Generate an image for the given request.
    async fn generate(&self, request: ImageRequest) -> Result<GeneratedImage, GatewayError>;
}

/// Errors from image generation.
#[derive(Debug, Error)]
pub enum ImageError {
    /// The prompt was empty or whitespace; no upstream call was made.
    #[error("prompt cannot be empty")]
    EmptyPrompt,
    /// The image gateway failed; propagated untouched.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Turns a prompt into an image using the configured model and options.
#[derive(Clone)]
pub struct ImageService {
    client: Arc<dyn ImageClient>,
    config: Config,
}

impl ImageService {
    /// Create a service over the given image gateway.
    pub fn new(client: Arc<dyn ImageClient>, config: Config) -> Self {
        Self { client, config }
    }

    /// Generate an image for `prompt`.
    ///
    /// Blank input fails fast locally; a paid upstream call is never made for
    /// a vacuous request.
    ///
    /// # Errors
    /// [`ImageError::EmptyPrompt`] for blank input, or the gateway failure.
    pub async fn generate(&self, prompt: &str) -> Result<GeneratedImage, ImageError> {
        if prompt.trim().is_empty() {
            return Err(ImageError::EmptyPrompt);
        }

        let image = self
            .client
            .generate(ImageRequest {
                model: self.config.image_model.clone(),
                prompt: prompt.to_string(),
                size: self.config.image_size.clone(),
                quality: self.config.image_quality.clone(),
                format: self.config.image_format.clone(),
                background: self.config.image_background.clone(),
            })
            .await?;
        Ok(image)
    }
}
