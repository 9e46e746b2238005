//! Feature vocabulary for random avatars
//!
//! Holds the descriptor lists each avatar feature is drawn from, and the
//! uniform choice over them.

use crate::{Error, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;

const HEAD_SHAPES: &[&str] = &[
    "a rounded square head",
    "a circular head",
    "an irregular blob-like head",
    "a slightly squarish head with soft corners",
];

const EYE_STYLES: &[&str] = &[
    "two simple dot eyes",
    "two small circular eyes",
    "two short horizontal line eyes",
    "two small oval eyes",
    "two half-moon upward-curved eyes",
];

const MOUTH_STYLES: &[&str] = &[
    "a gently smiling curve mouth",
    "a straight line mouth",
    "a slightly wavy line mouth",
    "a small U-shaped mouth",
    "a short dash mouth",
];

const NO_ACCESSORY: &str = "no hair or accessory";

const TOP_ACCESSORIES: &[&str] = &[
    NO_ACCESSORY,
    "a small abstract leaf on top",
    "a single spike on top",
    "a small cloud shape on top",
    "a simple wavy hair outline",
    "a tiny, rounded horn",
];

const NO_DETAIL: &str = "";

// The empty entry keeps details rarer than the other features.
const UNIQUE_DETAILS: &[&str] = &[
    NO_DETAIL,
    "a tiny triangular nose",
    "a small question mark floating near the head",
    "a small star pattern on its cheek",
    "a small abstract geometric pattern on its forehead",
    "a single teardrop shape under one eye",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    HeadShape,
    EyeStyle,
    MouthStyle,
    TopAccessory,
    UniqueDetail,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::HeadShape,
        Category::EyeStyle,
        Category::MouthStyle,
        Category::TopAccessory,
        Category::UniqueDetail,
    ];

    /// Optional features may be left out of a prompt; the rest always render.
    pub fn is_optional(self) -> bool {
        matches!(self, Category::TopAccessory | Category::UniqueDetail)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::HeadShape => "head_shape",
            Category::EyeStyle => "eye_style",
            Category::MouthStyle => "mouth_style",
            Category::TopAccessory => "top_accessory",
            Category::UniqueDetail => "unique_detail",
        };
        write!(f, "{}", name)
    }
}

/// Ordered descriptor list for one category, with an optional "none" entry
/// that means the feature is left out.
#[derive(Debug, Clone, Deserialize)]
pub struct DescriptorList {
    pub descriptors: Vec<String>,
    #[serde(default)]
    pub none: Option<String>,
}

impl DescriptorList {
    fn from_static(descriptors: &[&str], none: Option<&str>) -> Self {
        Self {
            descriptors: descriptors.iter().map(|d| (*d).to_string()).collect(),
            none: none.map(str::to_string),
        }
    }

    pub fn is_none(&self, descriptor: &str) -> bool {
        self.none.as_deref() == Some(descriptor)
    }
}

/// All avatar feature categories.
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureVocabulary {
    head_shape: DescriptorList,
    eye_style: DescriptorList,
    mouth_style: DescriptorList,
    top_accessory: DescriptorList,
    unique_detail: DescriptorList,
}

/// One descriptor per category, with "none" draws already dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureDraw {
    pub head_shape: String,
    pub eye_style: String,
    pub mouth_style: String,
    pub top_accessory: Option<String>,
    pub unique_detail: Option<String>,
}

impl Default for FeatureVocabulary {
    fn default() -> Self {
        Self::builtin()
    }
}

impl FeatureVocabulary {
    pub fn builtin() -> Self {
        Self {
            head_shape: DescriptorList::from_static(HEAD_SHAPES, None),
            eye_style: DescriptorList::from_static(EYE_STYLES, None),
            mouth_style: DescriptorList::from_static(MOUTH_STYLES, None),
            top_accessory: DescriptorList::from_static(TOP_ACCESSORIES, Some(NO_ACCESSORY)),
            unique_detail: DescriptorList::from_static(UNIQUE_DETAILS, Some(NO_DETAIL)),
        }
    }

    /// The file at `path` when one is configured, the built-in lists otherwise.
    pub fn from_optional_path(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                tracing::info!("Loading feature vocabulary from {}", path.display());
                Self::from_file(path)
            }
            None => Ok(Self::builtin()),
        }
    }

    /// Load a vocabulary from a JSON file keyed by category name.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!(
                "Failed to read vocabulary {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let vocabulary: Self = serde_json::from_str(raw)
            .map_err(|e| Error::Configuration(format!("Invalid vocabulary: {}", e)))?;
        vocabulary.validate()?;
        Ok(vocabulary)
    }

    fn validate(&self) -> Result<()> {
        for category in Category::ALL {
            let list = self.list(category);
            if list.descriptors.is_empty() {
                return Err(Error::Configuration(format!(
                    "Vocabulary category {} has no descriptors",
                    category
                )));
            }
            if list.none.is_some() && !category.is_optional() {
                return Err(Error::Configuration(format!(
                    "Vocabulary category {} is required and cannot declare a none entry",
                    category
                )));
            }
            // Only the sentinel may be blank; anything else would render an empty slot.
            if let Some(blank) = list
                .descriptors
                .iter()
                .find(|d| d.trim().is_empty() && !list.is_none(d))
            {
                return Err(Error::Configuration(format!(
                    "Vocabulary category {} has a blank descriptor {:?}",
                    category, blank
                )));
            }
        }
        Ok(())
    }

    pub fn list(&self, category: Category) -> &DescriptorList {
        match category {
            Category::HeadShape => &self.head_shape,
            Category::EyeStyle => &self.eye_style,
            Category::MouthStyle => &self.mouth_style,
            Category::TopAccessory => &self.top_accessory,
            Category::UniqueDetail => &self.unique_detail,
        }
    }

    /// Uniformly pick one descriptor, or `None` when the "none" entry is drawn.
    pub fn choose(&self, category: Category, rng: &mut impl Rng) -> Option<&str> {
        let list = self.list(category);
        let drawn = list.descriptors.choose(rng)?;
        if list.is_none(drawn) {
            None
        } else {
            Some(drawn.as_str())
        }
    }

    fn required(&self, category: Category, rng: &mut impl Rng) -> String {
        self.choose(category, rng).unwrap_or_default().to_string()
    }

    /// Draw every category once, in declaration order.
    pub fn draw(&self, rng: &mut impl Rng) -> FeatureDraw {
        FeatureDraw {
            head_shape: self.required(Category::HeadShape, rng),
            eye_style: self.required(Category::EyeStyle, rng),
            mouth_style: self.required(Category::MouthStyle, rng),
            top_accessory: self
                .choose(Category::TopAccessory, rng)
                .map(str::to_string),
            unique_detail: self
                .choose(Category::UniqueDetail, rng)
                .map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_builtin_categories_are_non_empty() {
        let vocabulary = FeatureVocabulary::builtin();
        vocabulary.validate().unwrap();
        for category in Category::ALL {
            assert!(!vocabulary.list(category).descriptors.is_empty());
        }
    }

    #[test]
    fn test_every_descriptor_is_reachable() {
        let vocabulary = FeatureVocabulary::builtin();
        let mut rng = StdRng::seed_from_u64(7);

        for category in Category::ALL {
            let list = vocabulary.list(category);
            let mut seen: HashSet<Option<String>> = HashSet::new();
            for _ in 0..2_000 {
                seen.insert(vocabulary.choose(category, &mut rng).map(str::to_string));
            }

            for descriptor in &list.descriptors {
                let expected = if list.is_none(descriptor) {
                    None
                } else {
                    Some(descriptor.clone())
                };
                assert!(
                    seen.contains(&expected),
                    "{} never drew {:?}",
                    category,
                    descriptor
                );
            }
        }
    }

    #[test]
    fn test_none_sentinel_is_never_returned() {
        let vocabulary = FeatureVocabulary::builtin();
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..500 {
            let draw = vocabulary.draw(&mut rng);
            assert_ne!(draw.top_accessory.as_deref(), Some(NO_ACCESSORY));
            assert_ne!(draw.unique_detail.as_deref(), Some(NO_DETAIL));
        }
    }

    #[test]
    fn test_same_seed_same_draws() {
        let vocabulary = FeatureVocabulary::builtin();
        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);

        for _ in 0..20 {
            assert_eq!(vocabulary.draw(&mut a), vocabulary.draw(&mut b));
        }
    }

    #[test]
    fn test_from_json_custom_vocabulary() {
        let raw = r#"{
            "head_shape": { "descriptors": ["a hexagonal head"] },
            "eye_style": { "descriptors": ["two cross eyes"] },
            "mouth_style": { "descriptors": ["a zigzag mouth"] },
            "top_accessory": { "descriptors": ["nothing"], "none": "nothing" },
            "unique_detail": { "descriptors": ["a freckle"] }
        }"#;

        let vocabulary = FeatureVocabulary::from_json(raw).unwrap();
        let draw = vocabulary.draw(&mut StdRng::seed_from_u64(1));

        assert_eq!(draw.head_shape, "a hexagonal head");
        assert_eq!(draw.top_accessory, None);
        assert_eq!(draw.unique_detail.as_deref(), Some("a freckle"));
    }

    #[test]
    fn test_from_json_rejects_empty_category() {
        let raw = r#"{
            "head_shape": { "descriptors": [] },
            "eye_style": { "descriptors": ["x"] },
            "mouth_style": { "descriptors": ["x"] },
            "top_accessory": { "descriptors": ["x"] },
            "unique_detail": { "descriptors": ["x"] }
        }"#;

        let err = FeatureVocabulary::from_json(raw).unwrap_err();
        assert!(matches!(err, Error::Configuration(ref msg) if msg.contains("head_shape")));
    }

    #[test]
    fn test_from_json_rejects_none_on_required_category() {
        let raw = r#"{
            "head_shape": { "descriptors": ["none"], "none": "none" },
            "eye_style": { "descriptors": ["two dot eyes"] },
            "mouth_style": { "descriptors": ["a dash mouth"] },
            "top_accessory": { "descriptors": ["a cap"] },
            "unique_detail": { "descriptors": ["x"] }
        }"#;

        let err = FeatureVocabulary::from_json(raw).unwrap_err();
        assert!(matches!(err, Error::Configuration(ref msg) if msg.contains("head_shape")));
    }

    #[test]
    fn test_from_json_rejects_blank_descriptor_without_sentinel() {
        let raw = r#"{
            "head_shape": { "descriptors": ["a round head"] },
            "eye_style": { "descriptors": ["two dot eyes"] },
            "mouth_style": { "descriptors": ["a dash mouth"] },
            "top_accessory": { "descriptors": ["", "a cap"] },
            "unique_detail": { "descriptors": ["x"] }
        }"#;

        let err = FeatureVocabulary::from_json(raw).unwrap_err();
        assert!(matches!(err, Error::Configuration(ref msg) if msg.contains("top_accessory")));
    }

    #[test]
    fn test_blank_sentinel_is_allowed_on_optional_category() {
        let raw = r#"{
            "head_shape": { "descriptors": ["a round head"] },
            "eye_style": { "descriptors": ["two dot eyes"] },
            "mouth_style": { "descriptors": ["a dash mouth"] },
            "top_accessory": { "descriptors": ["a cap"] },
            "unique_detail": { "descriptors": [""], "none": "" }
        }"#;

        let vocabulary = FeatureVocabulary::from_json(raw).unwrap();
        let draw = vocabulary.draw(&mut StdRng::seed_from_u64(3));
        assert_eq!(draw.unique_detail, None);
    }

    #[test]
    fn test_from_file_reads_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vocabulary.json");
        fs::write(
            &path,
            r#"{
                "head_shape": { "descriptors": ["a"] },
                "eye_style": { "descriptors": ["b"] },
                "mouth_style": { "descriptors": ["c"] },
                "top_accessory": { "descriptors": ["d"] },
                "unique_detail": { "descriptors": ["e"] }
            }"#,
        )
        .unwrap();

        let vocabulary = FeatureVocabulary::from_file(&path).unwrap();
        assert_eq!(vocabulary.list(Category::MouthStyle).descriptors, vec!["c"]);
    }

    #[test]
    fn test_from_optional_path_defaults_to_builtin() {
        let vocabulary = FeatureVocabulary::from_optional_path(None).unwrap();
        assert_eq!(
            vocabulary.list(Category::HeadShape).descriptors.len(),
            HEAD_SHAPES.len()
        );

        let missing = Path::new("/nonexistent/vocab.json");
        let err = FeatureVocabulary::from_optional_path(Some(missing)).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_from_file_missing_is_configuration_error() {
        let err = FeatureVocabulary::from_file(Path::new("/nonexistent/vocab.json")).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }
}
