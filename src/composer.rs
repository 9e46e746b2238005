//! Prompt composition for both generation modes.

use crate::models::{InputImage, Mode, PromptSpec};
use crate::prompts;
use crate::vocabulary::{FeatureDraw, FeatureVocabulary};
use crate::{Error, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

/// Builds prompts from a vocabulary and an owned random source.
pub struct PromptComposer {
    vocabulary: FeatureVocabulary,
    rng: Mutex<StdRng>,
}

impl PromptComposer {
    pub fn new(vocabulary: FeatureVocabulary) -> Self {
        Self::with_rng(vocabulary, StdRng::from_entropy())
    }

    /// Composer whose avatar prompts are reproducible for a given seed.
    pub fn with_seed(vocabulary: FeatureVocabulary, seed: u64) -> Self {
        Self::with_rng(vocabulary, StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(vocabulary: FeatureVocabulary, rng: StdRng) -> Self {
        Self {
            vocabulary,
            rng: Mutex::new(rng),
        }
    }

    pub fn vocabulary(&self) -> &FeatureVocabulary {
        &self.vocabulary
    }

    pub fn compose(&self, mode: Mode, input: Option<&InputImage>) -> Result<PromptSpec> {
        match mode {
            Mode::RandomAvatar => {
                let mut rng = self
                    .rng
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
                Ok(compose_avatar(&self.vocabulary, &mut *rng))
            }
            Mode::StyleTransform => {
                if input.is_none() {
                    return Err(Error::MissingInput(
                        "style transform requires an input image".to_string(),
                    ));
                }
                Ok(compose_transform())
            }
        }
    }
}

/// Draw features and render the avatar prompt. The style clauses are
/// appended verbatim whatever was drawn.
pub fn compose_avatar(vocabulary: &FeatureVocabulary, rng: &mut impl Rng) -> PromptSpec {
    let draw = vocabulary.draw(rng);
    tracing::debug!(?draw, "Drew avatar features");

    PromptSpec {
        mode: Mode::RandomAvatar,
        text: render_avatar(&draw),
    }
}

fn render_avatar(draw: &FeatureDraw) -> String {
    let mut sentences = vec![prompts::render(
        prompts::AVATAR_SUBJECT.trim(),
        &[
            ("head", &draw.head_shape),
            ("eyes", &draw.eye_style),
            ("mouth", &draw.mouth_style),
        ],
    )];

    if let Some(accessory) = &draw.top_accessory {
        sentences.push(prompts::render(
            prompts::AVATAR_ACCESSORY,
            &[("accessory", accessory)],
        ));
    }
    if let Some(detail) = &draw.unique_detail {
        sentences.push(prompts::render(prompts::AVATAR_DETAIL, &[("detail", detail)]));
    }

    sentences.push(prompts::AVATAR_STYLE.trim().to_string());
    sentences.join(" ")
}

pub fn compose_transform() -> PromptSpec {
    PromptSpec {
        mode: Mode::StyleTransform,
        text: prompts::TRANSFORM.trim().to_string(),
    }
}
