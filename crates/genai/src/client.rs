//! HTTP client for the generation API, wrapping [`reqwest`].

use async_trait::async_trait;

use charstudio_core::aspect::AspectRatio;

use crate::error::GenAiError;
use crate::generator::{GeneratedPayload, ImageGenerator, PromptPart};
use crate::messages::{
    extract_image, extract_prediction, GenerateContentRequest, PredictInstance, PredictParameters,
    PredictRequest,
};

/// Default public endpoint of the generation API.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Model used for reference-conditioned generation, editing, enhancing,
/// and regenerating.
pub const DEFAULT_MULTIMODAL_MODEL: &str = "gemini-2.5-flash-image";

/// Model used for standalone text-to-image generation.
pub const DEFAULT_TEXT_MODEL: &str = "imagen-4.0-generate-001";

/// Connection configuration for the generation API.
#[derive(Debug, Clone)]
pub struct GenAiConfig {
    /// API key. Absent means every call fails with
    /// [`GenAiError::MissingApiKey`]; startup still succeeds so the rest
    /// of the app stays usable.
    pub api_key: Option<String>,
    pub base_url: String,
    pub multimodal_model: String,
    pub text_model: String,
}

impl Default for GenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            multimodal_model: DEFAULT_MULTIMODAL_MODEL.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
        }
    }
}

impl GenAiConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var             | Default                        |
    /// |---------------------|--------------------------------|
    /// | `GEMINI_API_KEY`    | unset (calls fail)             |
    /// | `GENAI_BASE_URL`    | the public endpoint            |
    /// | `GENAI_IMAGE_MODEL` | `gemini-2.5-flash-image`       |
    /// | `GENAI_TEXT_MODEL`  | `imagen-4.0-generate-001`      |
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_key: std::env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty()),
            base_url: std::env::var("GENAI_BASE_URL").unwrap_or(defaults.base_url),
            multimodal_model: std::env::var("GENAI_IMAGE_MODEL")
                .unwrap_or(defaults.multimodal_model),
            text_model: std::env::var("GENAI_TEXT_MODEL").unwrap_or(defaults.text_model),
        }
    }
}

/// Client for one generation API endpoint.
pub struct GenAiClient {
    client: reqwest::Client,
    config: GenAiConfig,
}

impl GenAiClient {
    pub fn new(config: GenAiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Reuse an existing [`reqwest::Client`] for connection pooling.
    pub fn with_client(client: reqwest::Client, config: GenAiConfig) -> Self {
        Self { client, config }
    }

    fn api_key(&self) -> Result<&str, GenAiError> {
        self.config
            .api_key
            .as_deref()
            .ok_or(GenAiError::MissingApiKey)
    }

    async fn post_json<Req, Resp>(&self, url: String, body: &Req) -> Result<Resp, GenAiError>
    where
        Req: serde::Serialize,
        Resp: serde::de::DeserializeOwned,
    {
        let key = self.api_key()?;
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            tracing::error!(status = status.as_u16(), %body, "Generation API returned an error");
            return Err(GenAiError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json::<Resp>().await?)
    }
}

#[async_trait]
impl ImageGenerator for GenAiClient {
    async fn generate_multimodal(
        &self,
        parts: &[PromptPart],
    ) -> Result<GeneratedPayload, GenAiError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url, self.config.multimodal_model
        );
        let request = GenerateContentRequest::from_parts(parts);
        let response = self.post_json(url, &request).await?;
        extract_image(response)
    }

    async fn generate_from_text(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
    ) -> Result<GeneratedPayload, GenAiError> {
        let url = format!(
            "{}/models/{}:predict",
            self.config.base_url, self.config.text_model
        );
        let request = PredictRequest {
            instances: vec![PredictInstance {
                prompt: prompt.to_string(),
            }],
            parameters: PredictParameters {
                sample_count: 1,
                aspect_ratio: aspect_ratio.api_value(),
                output_mime_type: "image/png",
            },
        };
        let response = self.post_json(url, &request).await?;
        extract_prediction(response)
    }
}
