//! Process configuration loaded from the environment (and `.env`).

use crate::ai::gemini::client::DEFAULT_BASE_URL;
use crate::{Error, Result};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_AVATAR_MODEL: &str = "imagen-4.0-generate-001";
pub const DEFAULT_TRANSFORM_MODEL: &str = "gemini-2.5-flash-image";

#[derive(Clone)]
pub struct Config {
    pub api_key: String,
    pub avatar_model: String,
    pub transform_model: String,
    pub base_url: String,
    pub request_timeout: Option<Duration>,
    pub vocabulary_path: Option<PathBuf>,
}

// Keeps the key out of logs.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("avatar_model", &self.avatar_model)
            .field("transform_model", &self.transform_model)
            .field("base_url", &self.base_url)
            .field("request_timeout", &self.request_timeout)
            .field("vocabulary_path", &self.vocabulary_path)
            .finish()
    }
}

/// `VOCABULARY_PATH`, for callers that need the vocabulary without the rest of
/// the configuration (no API key required).
pub fn vocabulary_path_from_env() -> Option<PathBuf> {
    dotenvy::dotenv().ok();
    vocabulary_path_from_lookup(|key| std::env::var(key).ok())
}

fn vocabulary_path_from_lookup<F>(lookup: F) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    lookup("VOCABULARY_PATH")
        .filter(|value| !value.trim().is_empty())
        .map(|value| PathBuf::from(value.trim()))
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes `std::env::var`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let api_key = non_empty("GEMINI_API_KEY")
            .or_else(|| non_empty("API_KEY"))
            .map(|key| key.trim().to_string())
            .ok_or_else(|| {
                Error::Configuration(
                    "GEMINI_API_KEY (or API_KEY) is not set. Please ensure it's configured."
                        .to_string(),
                )
            })?;

        let request_timeout = match non_empty("REQUEST_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    Error::Configuration(format!(
                        "REQUEST_TIMEOUT_SECS must be a whole number of seconds, got '{}'",
                        raw
                    ))
                })?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        Ok(Self {
            api_key,
            avatar_model: non_empty("AVATAR_MODEL")
                .unwrap_or_else(|| DEFAULT_AVATAR_MODEL.to_string()),
            transform_model: non_empty("TRANSFORM_MODEL")
                .unwrap_or_else(|| DEFAULT_TRANSFORM_MODEL.to_string()),
            base_url: non_empty("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            request_timeout,
            vocabulary_path: vocabulary_path_from_lookup(&lookup),
        })
    }
}
