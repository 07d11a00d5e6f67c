//! The generator seam between orchestration and the wire client.
//!
//! Orchestration code (and its tests) talk to [`ImageGenerator`] rather
//! than to [`crate::GenAiClient`] directly, so batch/partial-failure
//! behaviour can be exercised without a network.

use async_trait::async_trait;

use charstudio_core::aspect::AspectRatio;
use charstudio_core::data_url;
use charstudio_core::error::CoreError;
use charstudio_core::model::{Image, UsageMetadata};

use crate::error::GenAiError;

/// One element of a multimodal prompt, in order.
#[derive(Debug, Clone)]
pub enum PromptPart {
    Text(String),
    /// An image carried as its MIME type plus base64 payload.
    InlineImage { mime_type: String, data: String },
}

impl PromptPart {
    /// Build an inline-image part from a stored data URL.
    pub fn from_data_url(url: &str) -> Result<Self, CoreError> {
        let (mime_type, data) = data_url::split(url)?;
        Ok(Self::InlineImage {
            mime_type: mime_type.to_string(),
            data: data.to_string(),
        })
    }

    /// Build an inline-image part from a reference image.
    pub fn from_image(image: &Image) -> Result<Self, CoreError> {
        Self::from_data_url(&image.data_url)
    }
}

/// Normalized result of one successful generation call.
#[derive(Debug, Clone)]
pub struct GeneratedPayload {
    /// `data:<mime>;base64,<payload>` string ready for storage/display.
    pub data_url: String,
    /// Token accounting, when the API path reports it.
    pub usage_metadata: Option<UsageMetadata>,
}

/// The two logical operations the studio consumes from the generation API.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Generate one image conditioned on an ordered part list
    /// (reference images and/or a source image, then the prompt text).
    async fn generate_multimodal(
        &self,
        parts: &[PromptPart],
    ) -> Result<GeneratedPayload, GenAiError>;

    /// Generate one image from text alone on the general-purpose model
    /// path, which takes the aspect ratio as a real parameter.
    async fn generate_from_text(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
    ) -> Result<GeneratedPayload, GenAiError>;
}
