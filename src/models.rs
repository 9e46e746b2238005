//! Data models and structures
//!
//! Defines the values that flow through one generation: the caller's mode
//! selection and input photo, the composed prompt, the request sent to the
//! remote model, and the image handed back.

use crate::ai::mime::{detect_image_mime, normalize_mime_type};
use crate::{Error, Result};
use base64::Engine as _;
use std::fmt;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Caller-facing mode selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    RandomAvatar,
    StyleTransform,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::RandomAvatar => write!(f, "random-avatar"),
            Mode::StyleTransform => write!(f, "style-transform"),
        }
    }
}

/// A validated generation job. Each variant carries exactly the payload its
/// model family needs.
#[derive(Debug, Clone)]
pub enum GenerationMode {
    RandomAvatar,
    Transform(InputImage),
}

impl GenerationMode {
    /// Check the caller's preconditions for `mode` and pair it with its input.
    pub fn new(mode: Mode, input: Option<InputImage>) -> Result<Self> {
        match mode {
            Mode::RandomAvatar => {
                if input.is_some() {
                    tracing::warn!("Input image ignored in random-avatar mode");
                }
                Ok(GenerationMode::RandomAvatar)
            }
            Mode::StyleTransform => {
                let input = input.ok_or_else(|| {
                    Error::MissingInput("style transform requires an input image".to_string())
                })?;
                input.validate()?;
                Ok(GenerationMode::Transform(input))
            }
        }
    }

    pub fn mode(&self) -> Mode {
        match self {
            GenerationMode::RandomAvatar => Mode::RandomAvatar,
            GenerationMode::Transform(_) => Mode::StyleTransform,
        }
    }

    pub fn input(&self) -> Option<&InputImage> {
        match self {
            GenerationMode::RandomAvatar => None,
            GenerationMode::Transform(input) => Some(input),
        }
    }

    pub fn into_input(self) -> Option<InputImage> {
        match self {
            GenerationMode::RandomAvatar => None,
            GenerationMode::Transform(input) => Some(input),
        }
    }
}

/// Photo supplied by the caller for style transforms.
#[derive(Clone, PartialEq, Eq)]
pub struct InputImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl fmt::Debug for InputImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputImage")
            .field("bytes", &format_args!("[{} bytes]", self.bytes.len()))
            .field("mime_type", &self.mime_type)
            .finish()
    }
}

impl InputImage {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: normalize_mime_type(&mime_type.into()),
        }
    }

    /// Parse a base64 `data:` URL, the shape a browser file picker hands over.
    pub fn from_data_url(url: &str) -> Result<Self> {
        let rest = url
            .trim()
            .strip_prefix("data:")
            .ok_or_else(|| Error::InvalidInput("not a data URL".to_string()))?;
        let (meta, payload) = rest
            .split_once(',')
            .ok_or_else(|| Error::InvalidInput("data URL has no payload".to_string()))?;
        let mime_type = meta
            .strip_suffix(";base64")
            .ok_or_else(|| Error::InvalidInput("data URL is not base64 encoded".to_string()))?;

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| Error::InvalidInput(format!("data URL payload is not base64: {}", e)))?;

        Ok(Self::new(bytes, mime_type))
    }

    /// Read a photo from disk, sniffing its MIME type from the magic bytes.
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let mime_type = detect_image_mime(&bytes).unwrap_or("application/octet-stream");
        Ok(Self::new(bytes, mime_type))
    }

    /// Require an `image/*` MIME type and a header the `image` crate can read.
    pub fn validate(&self) -> Result<()> {
        if !self.mime_type.starts_with("image/") {
            return Err(Error::InvalidInput(format!(
                "unsupported MIME type '{}', expected an image",
                self.mime_type
            )));
        }
        if self.bytes.is_empty() {
            return Err(Error::InvalidInput("input image is empty".to_string()));
        }

        let (width, height) = image::ImageReader::new(Cursor::new(&self.bytes))
            .with_guessed_format()
            .map_err(|e| Error::InvalidInput(format!("could not read input image: {}", e)))?
            .into_dimensions()
            .map_err(|e| Error::InvalidInput(format!("input is not a decodable image: {}", e)))?;

        if let Some(detected) = detect_image_mime(&self.bytes) {
            if detected != self.mime_type {
                tracing::warn!(
                    "Declared MIME type {} does not match detected {}",
                    self.mime_type,
                    detected
                );
            }
        }

        tracing::debug!("Validated input image {}x{} ({})", width, height, self.mime_type);
        Ok(())
    }

    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.bytes)
    }
}

/// Fully resolved prompt text for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSpec {
    pub mode: Mode,
    pub text: String,
}

/// Output constraints sent along with every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    pub count: u32,
    pub mime_type: String,
    pub aspect_ratio: Option<String>,
}

impl OutputConfig {
    pub fn for_mode(mode: Mode) -> Self {
        let aspect_ratio = match mode {
            Mode::RandomAvatar => Some("1:1".to_string()),
            Mode::StyleTransform => None,
        };

        Self {
            count: 1,
            mime_type: "image/png".to_string(),
            aspect_ratio,
        }
    }
}

/// The realized payload handed to an [`crate::ai::ImageGenerationService`].
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub id: Uuid,
    pub model: String,
    pub prompt: PromptSpec,
    pub input: Option<InputImage>,
    pub output: OutputConfig,
}

/// Raw image bytes returned by a successful generation.
#[derive(Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl fmt::Debug for GeneratedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratedImage")
            .field("bytes", &format_args!("[{} bytes]", self.bytes.len()))
            .field("mime_type", &self.mime_type)
            .finish()
    }
}

impl GeneratedImage {
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.bytes)
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }

    /// File extension matching the MIME type, `png` when unknown.
    pub fn extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "image/jpeg" => "jpg",
            "image/webp" => "webp",
            _ => "png",
        }
    }

    /// Write the image into `dir` as `{YYYY-MM-DD}_{uuid}.{ext}`, creating the
    /// directory if needed.
    pub fn save_to(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let file_name = format!(
            "{}_{}.{}",
            chrono::Local::now().format("%Y-%m-%d"),
            Uuid::new_v4(),
            self.extension()
        );
        let path = dir.join(file_name);
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}
