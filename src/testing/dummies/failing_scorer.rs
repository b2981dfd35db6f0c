use crate::classifiers::Scorer;
use crate::core::{Prediction, RasterImage};
use crate::error::{Result, SketchError};

#[derive(Default)]
pub struct FailingScorer;

impl Scorer for FailingScorer {
    fn score(&self, _image: &RasterImage) -> Result<Option<Prediction>> {
        Err(SketchError::Scorer("model unavailable".to_string()))
    }

    fn reload(&mut self) -> Result<()> {
        Err(SketchError::Scorer("model unavailable".to_string()))
    }

    fn name(&self) -> &str {
        "failing"
    }
}
