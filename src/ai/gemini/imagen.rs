use super::client::GeminiHttpClient;
use super::types::{
    OutputOptions, PredictInstance, PredictParameters, PredictRequest, PredictResponse,
};
use crate::ai::{decode_image, EncodedImage, ExtractImage, ImageGenerationService};
use crate::models::{GeneratedImage, GenerationRequest};
use crate::{Error, Result};
use async_trait::async_trait;

/// Text-to-image client for Imagen models (`:predict`).
pub struct ImagenClient {
    http: GeminiHttpClient,
}

impl ImagenClient {
    pub fn new(http: GeminiHttpClient) -> Self {
        Self { http }
    }
}

fn build_request(request: &GenerationRequest) -> PredictRequest {
    PredictRequest {
        instances: vec![PredictInstance {
            prompt: request.prompt.text.clone(),
        }],
        parameters: PredictParameters {
            sample_count: request.output.count,
            aspect_ratio: request.output.aspect_ratio.clone(),
            output_options: OutputOptions {
                mime_type: request.output.mime_type.clone(),
            },
        },
    }
}

impl ExtractImage for PredictResponse {
    fn extract_image(&self) -> Option<EncodedImage<'_>> {
        self.predictions.iter().find_map(|p| {
            p.bytes_base64_encoded.as_deref().map(|data| EncodedImage {
                data,
                mime_type: p.mime_type.as_deref(),
            })
        })
    }

    fn empty_reason(&self) -> Option<String> {
        self.predictions
            .iter()
            .find_map(|p| p.rai_filtered_reason.clone())
    }
}

#[async_trait]
impl ImageGenerationService for ImagenClient {
    async fn generate_image(&self, request: &GenerationRequest) -> Result<GeneratedImage> {
        if request.input.is_some() {
            return Err(Error::InvalidInput(format!(
                "{} is a text-to-image model and takes no input image",
                request.model
            )));
        }

        tracing::debug!(
            "Sending Imagen predict request {} (model: {})",
            request.id,
            request.model
        );
        let response: PredictResponse = self
            .http
            .predict(&request.model, &build_request(request))
            .await?;

        tracing::debug!("Imagen returned {} prediction(s)", response.predictions.len());
        decode_image(&response, "Imagen")
    }
}
