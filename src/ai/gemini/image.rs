use super::client::GeminiHttpClient;
use super::types::{Content, GenerateContentResponse, InlineData, Part};
use crate::ai::{decode_image, EncodedImage, ExtractImage, ImageGenerationService};
use crate::models::{GeneratedImage, GenerationRequest};
use crate::{Error, Result};
use async_trait::async_trait;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct ImageRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: ImageGenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageGenerationConfig {
    response_modalities: Vec<String>,
    candidate_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_config: Option<ImageConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageConfig {
    aspect_ratio: String,
}

/// Image+text-to-image client for Gemini image models (`:generateContent`).
pub struct GeminiImageClient {
    http: GeminiHttpClient,
}

impl GeminiImageClient {
    pub fn new(http: GeminiHttpClient) -> Self {
        Self { http }
    }
}

fn build_request(request: &GenerationRequest) -> ImageRequest {
    let mut parts = Vec::with_capacity(2);
    if let Some(input) = &request.input {
        parts.push(Part::InlineData {
            inline_data: InlineData {
                mime_type: input.mime_type.clone(),
                data: input.to_base64(),
            },
        });
    }
    parts.push(Part::Text {
        text: request.prompt.text.clone(),
    });

    ImageRequest {
        contents: vec![Content {
            role: Some("user".to_string()),
            parts,
        }],
        generation_config: ImageGenerationConfig {
            response_modalities: vec!["IMAGE".to_string()],
            candidate_count: request.output.count,
            image_config: request
                .output
                .aspect_ratio
                .clone()
                .map(|aspect_ratio| ImageConfig { aspect_ratio }),
        },
    }
}

impl ExtractImage for GenerateContentResponse {
    fn extract_image(&self) -> Option<EncodedImage<'_>> {
        self.candidates
            .iter()
            .filter_map(|c| c.content.as_ref())
            .flat_map(|content| content.parts.iter())
            .find_map(|part| match part {
                Part::InlineData { inline_data } if inline_data.mime_type.starts_with("image/") => {
                    Some(EncodedImage {
                        data: inline_data.data.as_str(),
                        mime_type: Some(inline_data.mime_type.as_str()),
                    })
                }
                _ => None,
            })
    }

    fn empty_reason(&self) -> Option<String> {
        if let Some(reason) = self
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.clone())
        {
            return Some(format!("prompt blocked ({})", reason));
        }

        let text: Vec<&str> = self
            .candidates
            .iter()
            .filter_map(|c| c.content.as_ref())
            .flat_map(|content| content.parts.iter())
            .filter_map(|part| match part {
                Part::Text { text } => Some(text.trim()),
                _ => None,
            })
            .filter(|text| !text.is_empty())
            .collect();
        if !text.is_empty() {
            return Some(text.join(" "));
        }

        self.candidates
            .iter()
            .find_map(|c| c.finish_reason.clone())
            .map(|reason| format!("finish reason {}", reason))
    }
}

#[async_trait]
impl ImageGenerationService for GeminiImageClient {
    async fn generate_image(&self, request: &GenerationRequest) -> Result<GeneratedImage> {
        let input = request.input.as_ref().ok_or_else(|| {
            Error::MissingInput(format!("{} needs an input image", request.model))
        })?;

        tracing::debug!(
            "Sending Gemini image request {} (model: {}, input: {} bytes, {})",
            request.id,
            request.model,
            input.bytes.len(),
            input.mime_type
        );

        let gemini_response: GenerateContentResponse = self
            .http
            .generate_content(&request.model, &build_request(request))
            .await?;

        let image = decode_image(&gemini_response, "Gemini")?;
        tracing::debug!("Gemini returned image with mime_type: {}", image.mime_type);
        Ok(image)
    }
}
