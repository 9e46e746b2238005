//! Remote image model integration
//!
//! Two model families sit behind [`ImageGenerationService`]: Imagen for
//! text-to-image avatars and Gemini for image+text style transforms. Their
//! responses differ in shape, so each implements [`ExtractImage`].

pub mod extract;
pub mod gemini;
pub mod mime;
pub mod mock;

pub use extract::{decode_image, EncodedImage, ExtractImage};
pub use gemini::{GeminiImageClient, ImagenClient};
pub use mock::MockImageGenerationClient;

use crate::models::{GeneratedImage, GenerationRequest};
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ImageGenerationService: Send + Sync {
    /// Send `request` once and return the first image the model produced.
    async fn generate_image(&self, request: &GenerationRequest) -> Result<GeneratedImage>;
}
