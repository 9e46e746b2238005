use crate::models::GeneratedImage;
use crate::{Error, Result};
use base64::Engine as _;

/// Base64 image payload borrowed from a provider response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedImage<'a> {
    pub data: &'a str,
    pub mime_type: Option<&'a str>,
}

/// Locate the generated image in a provider response.
pub trait ExtractImage {
    /// First image in response order, or `None` when nothing was produced.
    fn extract_image(&self) -> Option<EncodedImage<'_>>;

    /// Provider explanation for an empty response (filter reason, model text).
    fn empty_reason(&self) -> Option<String> {
        None
    }
}

/// Extract and decode the image, mapping "not found" to [`Error::EmptyResult`].
pub fn decode_image<R: ExtractImage>(response: &R, provider: &str) -> Result<GeneratedImage> {
    let encoded = response.extract_image().ok_or_else(|| {
        let message = match response.empty_reason() {
            Some(reason) => format!("{} returned no image data: {}", provider, reason),
            None => format!("{} returned no image data", provider),
        };
        Error::EmptyResult(message)
    })?;

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded.data)
        .map_err(|e| Error::Service(format!("Failed to decode {} base64 image: {}", provider, e)))?;

    if bytes.is_empty() {
        return Err(Error::EmptyResult(format!(
            "{} returned an empty image",
            provider
        )));
    }

    Ok(GeneratedImage {
        bytes,
        mime_type: encoded.mime_type.unwrap_or("image/png").to_string(),
    })
}
