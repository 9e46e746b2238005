//! Generation orchestration: one request from mode selection to image bytes.

use crate::ai::gemini::GeminiHttpClient;
use crate::ai::{GeminiImageClient, ImageGenerationService, ImagenClient};
use crate::composer::PromptComposer;
use crate::config::Config;
use crate::models::{
    GeneratedImage, GenerationMode, GenerationRequest, InputImage, Mode, OutputConfig,
};
use crate::vocabulary::FeatureVocabulary;
use crate::{Error, Result};
use std::sync::{Mutex, MutexGuard};
use tracing::{info, warn, Instrument};
use uuid::Uuid;

/// Lifecycle of the current (or most recent) request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationState {
    Idle,
    Composing,
    Dispatched,
    Succeeded,
    Failed,
}

impl GenerationState {
    pub fn is_in_flight(self) -> bool {
        matches!(self, GenerationState::Composing | GenerationState::Dispatched)
    }
}

/// Composes prompts, dispatches them to the model for the mode, and enforces
/// that only one request is outstanding at a time.
pub struct App {
    composer: PromptComposer,
    avatar_gen: Box<dyn ImageGenerationService>,
    transform_gen: Box<dyn ImageGenerationService>,
    avatar_model: String,
    transform_model: String,
    state: Mutex<GenerationState>,
}

/// Injectable service bundle used to construct [`App`] in tests/harnesses.
pub struct AppServices {
    pub composer: PromptComposer,
    pub avatar_gen: Box<dyn ImageGenerationService>,
    pub transform_gen: Box<dyn ImageGenerationService>,
    pub avatar_model: String,
    pub transform_model: String,
}

impl App {
    /// Build an app from concrete service dependencies.
    pub fn with_services(services: AppServices) -> Self {
        Self {
            composer: services.composer,
            avatar_gen: services.avatar_gen,
            transform_gen: services.transform_gen,
            avatar_model: services.avatar_model,
            transform_model: services.transform_model,
            state: Mutex::new(GenerationState::Idle),
        }
    }

    /// Construct an app from environment configuration (`Config::from_env`).
    pub fn new() -> Result<Self> {
        Self::from_config(&Config::from_env()?, None)
    }

    /// Construct the Gemini-backed app. `seed` makes avatar prompts reproducible.
    pub fn from_config(config: &Config, seed: Option<u64>) -> Result<Self> {
        let vocabulary = FeatureVocabulary::from_optional_path(config.vocabulary_path.as_deref())?;
        let composer = match seed {
            Some(seed) => PromptComposer::with_seed(vocabulary, seed),
            None => PromptComposer::new(vocabulary),
        };

        // One connection pool for both model families.
        let http = GeminiHttpClient::new_with_client(config.api_key.clone(), reqwest::Client::new())
            .with_base_url(config.base_url.as_str())
            .with_timeout(config.request_timeout);

        info!("Avatar provider: Imagen (model: {})", config.avatar_model);
        info!("Transform provider: Gemini (model: {})", config.transform_model);

        Ok(Self::with_services(AppServices {
            composer,
            avatar_gen: Box::new(ImagenClient::new(http.clone())),
            transform_gen: Box::new(GeminiImageClient::new(http)),
            avatar_model: config.avatar_model.clone(),
            transform_model: config.transform_model.clone(),
        }))
    }

    pub fn state(&self) -> GenerationState {
        *lock_state(&self.state)
    }

    /// True while a request is composing or awaiting the model.
    pub fn is_busy(&self) -> bool {
        self.state().is_in_flight()
    }

    /// Generate one image for `mode`. Style transforms need `input`.
    ///
    /// Fails with [`Error::Busy`] if another call on this app is still in flight.
    pub async fn generate(&self, mode: Mode, input: Option<InputImage>) -> Result<GeneratedImage> {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("generate", %request_id, %mode);

        async move {
            let flight = Flight::begin(&self.state)?;
            let result = self.run(request_id, mode, input, &flight).await;
            match &result {
                Ok(image) => info!("Generated {} bytes ({})", image.bytes.len(), image.mime_type),
                Err(e) => warn!("Generation failed: {}", e),
            }
            flight.finish(result.is_ok());
            result
        }
        .instrument(span)
        .await
    }

    async fn run(
        &self,
        request_id: Uuid,
        mode: Mode,
        input: Option<InputImage>,
        flight: &Flight<'_>,
    ) -> Result<GeneratedImage> {
        let job = GenerationMode::new(mode, input)?;
        let prompt = self.composer.compose(job.mode(), job.input())?;
        tracing::debug!("Composed prompt: {}", prompt.text);

        let (backend, model) = match &job {
            GenerationMode::RandomAvatar => (&self.avatar_gen, &self.avatar_model),
            GenerationMode::Transform(_) => (&self.transform_gen, &self.transform_model),
        };

        let request = GenerationRequest {
            id: request_id,
            model: model.clone(),
            prompt,
            input: job.into_input(),
            output: OutputConfig::for_mode(mode),
        };

        flight.advance(GenerationState::Dispatched);
        info!("Dispatching request to {}", request.model);
        backend.generate_image(&request).await
    }
}

fn lock_state(state: &Mutex<GenerationState>) -> MutexGuard<'_, GenerationState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Holds the single-flight slot for one call. Dropping it before `finish`
/// (for example when the caller abandons the future) marks the call failed.
struct Flight<'a> {
    state: &'a Mutex<GenerationState>,
    finished: bool,
}

impl<'a> Flight<'a> {
    fn begin(state: &'a Mutex<GenerationState>) -> Result<Self> {
        let mut current = lock_state(state);
        if current.is_in_flight() {
            warn!("Rejected overlapping generation request");
            return Err(Error::Busy);
        }
        *current = GenerationState::Composing;

        Ok(Self {
            state,
            finished: false,
        })
    }

    fn advance(&self, next: GenerationState) {
        *lock_state(self.state) = next;
        tracing::debug!("Generation state: {:?}", next);
    }

    fn finish(mut self, succeeded: bool) {
        self.finished = true;
        self.advance(if succeeded {
            GenerationState::Succeeded
        } else {
            GenerationState::Failed
        });
    }
}

impl Drop for Flight<'_> {
    fn drop(&mut self) {
        if !self.finished {
            warn!("Generation abandoned before completion");
            self.advance(GenerationState::Failed);
        }
    }
}
