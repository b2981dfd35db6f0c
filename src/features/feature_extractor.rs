use crate::core::{FeatureVector, RasterImage};

pub const DEFAULT_GRID_SIDE: u32 = 16;

pub trait FeatureExtractor: Send + Sync {
    /// Length of every vector this extractor produces.
    fn dimension(&self) -> usize;

    /// Total: malformed input yields an all-zero vector of `dimension()`.
    fn extract(&self, image: &RasterImage) -> FeatureVector;
}

/// Stretches the sketch onto a `side × side` grid and reads inverted gray per
/// cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridFeatureExtractor {
    side: u32,
}

impl GridFeatureExtractor {
    pub fn new(side: u32) -> Self {
        Self { side: side.max(1) }
    }

    pub fn side(&self) -> u32 {
        self.side
    }

    fn try_extract(&self, image: &RasterImage) -> Option<Vec<f64>> {
        let grid = image.resized(self.side, self.side)?;
        let mut values = Vec::with_capacity(self.dimension());
        for y in 0..self.side {
            for x in 0..self.side {
                let gray = grid.gray(x, y)?;
                values.push(1.0 - gray);
            }
        }
        Some(values)
    }
}

impl Default for GridFeatureExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_GRID_SIDE)
    }
}

impl FeatureExtractor for GridFeatureExtractor {
    #[inline]
    fn dimension(&self) -> usize {
        (self.side * self.side) as usize
    }

    fn extract(&self, image: &RasterImage) -> FeatureVector {
        match self.try_extract(image) {
            Some(values) => FeatureVector::new(values),
            None => FeatureVector::zeros(self.dimension()),
        }
    }
}
