//! Wire types for the generation API's REST endpoints.
//!
//! Two request shapes are used: `generateContent` for multimodal
//! generation (reference images + prompt) and `predict` for pure
//! text-to-image. Extraction of a normalized [`GeneratedPayload`] from
//! either response lives here so it can be unit-tested from JSON
//! fixtures without a network.

use serde::{Deserialize, Serialize};

use charstudio_core::data_url;
use charstudio_core::model::UsageMetadata;

use crate::error::GenAiError;
use crate::generator::{GeneratedPayload, PromptPart};

// ---------------------------------------------------------------------------
// generateContent request
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Content {
    pub parts: Vec<Part>,
}

/// A single prompt or response part; exactly one field is set.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_modalities: Vec<&'static str>,
}

impl GenerateContentRequest {
    /// Build a request asking for a single image back.
    pub fn from_parts(parts: &[PromptPart]) -> Self {
        let parts = parts
            .iter()
            .map(|part| match part {
                PromptPart::Text(text) => Part {
                    text: Some(text.clone()),
                    inline_data: None,
                },
                PromptPart::InlineImage { mime_type, data } => Part {
                    text: None,
                    inline_data: Some(InlineData {
                        mime_type: mime_type.clone(),
                        data: data.clone(),
                    }),
                },
            })
            .collect();
        Self {
            contents: vec![Content { parts }],
            generation_config: GenerationConfig {
                response_modalities: vec!["IMAGE"],
            },
        }
    }
}

// ---------------------------------------------------------------------------
// generateContent response
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<Content>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
    pub block_reason_message: Option<String>,
}

/// Pull the first inline image out of a multimodal response.
///
/// Precedence mirrors the API contract: an inline image wins; otherwise
/// an explicit block reason becomes [`GenAiError::Blocked`]; otherwise
/// the call produced nothing and fails with [`GenAiError::NoImage`].
pub fn extract_image(response: GenerateContentResponse) -> Result<GeneratedPayload, GenAiError> {
    let inline = response
        .candidates
        .into_iter()
        .filter_map(|c| c.content)
        .flat_map(|c| c.parts)
        .find_map(|part| part.inline_data);

    if let Some(inline) = inline {
        return Ok(GeneratedPayload {
            data_url: data_url::from_base64(&inline.mime_type, &inline.data),
            usage_metadata: response.usage_metadata,
        });
    }

    if let Some(feedback) = response.prompt_feedback {
        if let Some(reason) = feedback.block_reason {
            return Err(GenAiError::Blocked {
                reason,
                message: feedback.block_reason_message,
            });
        }
    }

    Err(GenAiError::NoImage)
}

// ---------------------------------------------------------------------------
// predict (text-to-image) request/response
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct PredictRequest {
    pub instances: Vec<PredictInstance>,
    pub parameters: PredictParameters,
}

#[derive(Debug, Serialize)]
pub struct PredictInstance {
    pub prompt: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictParameters {
    pub sample_count: u32,
    pub aspect_ratio: &'static str,
    pub output_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictResponse {
    #[serde(default)]
    pub predictions: Vec<Prediction>,
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub bytes_base64_encoded: Option<String>,
    #[serde(default = "default_prediction_mime")]
    pub mime_type: String,
}

fn default_prediction_mime() -> String {
    "image/png".to_string()
}

/// Pull the first predicted image out of a text-to-image response.
///
/// The predict path does not report token usage.
pub fn extract_prediction(response: PredictResponse) -> Result<GeneratedPayload, GenAiError> {
    let image = response
        .predictions
        .into_iter()
        .find_map(|p| p.bytes_base64_encoded.map(|bytes| (p.mime_type, bytes)));

    if let Some((mime_type, bytes)) = image {
        return Ok(GeneratedPayload {
            data_url: data_url::from_base64(&mime_type, &bytes),
            usage_metadata: None,
        });
    }

    if let Some(feedback) = response.prompt_feedback {
        if let Some(reason) = feedback.block_reason {
            return Err(GenAiError::Blocked {
                reason,
                message: feedback.block_reason_message,
            });
        }
    }

    Err(GenAiError::NoImage)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn request_serializes_parts_in_order() {
        let parts = vec![
            PromptPart::InlineImage {
                mime_type: "image/png".to_string(),
                data: "AAAA".to_string(),
            },
            PromptPart::Text("a cat".to_string()),
        ];
        let request = GenerateContentRequest::from_parts(&parts);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(
            json["contents"][0]["parts"][0]["inlineData"]["mimeType"],
            "image/png"
        );
        assert_eq!(json["contents"][0]["parts"][1]["text"], "a cat");
        assert_eq!(json["generationConfig"]["responseModalities"][0], "IMAGE");
    }

    #[test]
    fn extract_image_returns_the_inline_payload() {
        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": {
                    "parts": [
                        { "text": "here you go" },
                        { "inlineData": { "mimeType": "image/png", "data": "QUJD" } }
                    ]
                }
            }],
            "usageMetadata": {
                "promptTokenCount": 10,
                "candidatesTokenCount": 20,
                "totalTokenCount": 30
            }
        }))
        .unwrap();

        let payload = extract_image(response).unwrap();
        assert_eq!(payload.data_url, "data:image/png;base64,QUJD");
        assert_eq!(payload.usage_metadata.unwrap().total_token_count, 30);
    }

    #[test]
    fn extract_image_surfaces_the_block_reason() {
        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [],
            "promptFeedback": {
                "blockReason": "SAFETY",
                "blockReasonMessage": "Try a different prompt"
            }
        }))
        .unwrap();

        assert_matches!(
            extract_image(response),
            Err(GenAiError::Blocked { reason, message }) => {
                assert_eq!(reason, "SAFETY");
                assert_eq!(message.as_deref(), Some("Try a different prompt"));
            }
        );
    }

    #[test]
    fn extract_image_without_image_or_block_is_no_image() {
        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": "sorry" }] } }]
        }))
        .unwrap();

        assert_matches!(extract_image(response), Err(GenAiError::NoImage));
    }

    #[test]
    fn extract_prediction_wraps_bytes_as_a_data_url() {
        let response: PredictResponse = serde_json::from_value(serde_json::json!({
            "predictions": [{ "bytesBase64Encoded": "QUJD" }]
        }))
        .unwrap();

        let payload = extract_prediction(response).unwrap();
        assert_eq!(payload.data_url, "data:image/png;base64,QUJD");
        assert!(payload.usage_metadata.is_none());
    }

    #[test]
    fn extract_prediction_with_no_predictions_is_no_image() {
        let response: PredictResponse =
            serde_json::from_value(serde_json::json!({ "predictions": [] })).unwrap();
        assert_matches!(extract_prediction(response), Err(GenAiError::NoImage));
    }
}
