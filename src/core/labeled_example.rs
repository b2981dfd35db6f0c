use crate::augmentation::Transform;
use crate::core::{FeatureVector, RasterImage};
use crate::features::FeatureExtractor;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ExampleOrigin {
    Original,
    Augmented { transform: Transform },
}

impl ExampleOrigin {
    pub fn is_original(&self) -> bool {
        matches!(self, ExampleOrigin::Original)
    }
}

/// A taught sketch. Its descriptor is computed once, when the example is
/// built, with the extractor the store is queried with.
#[derive(Clone, Debug)]
pub struct LabeledExample {
    label: String,
    image: RasterImage,
    origin: ExampleOrigin,
    features: FeatureVector,
}

impl LabeledExample {
    pub fn new(
        label: impl Into<String>,
        image: RasterImage,
        origin: ExampleOrigin,
        extractor: &dyn FeatureExtractor,
    ) -> Self {
        let features = extractor.extract(&image);
        Self {
            label: label.into(),
            image,
            origin,
            features,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn image(&self) -> &RasterImage {
        &self.image
    }

    pub fn origin(&self) -> ExampleOrigin {
        self.origin
    }

    pub fn features(&self) -> &FeatureVector {
        &self.features
    }
}
