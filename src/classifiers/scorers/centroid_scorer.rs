use crate::classifiers::scorers::Scorer;
use crate::config::MAX_GRID_SIDE;
use crate::core::feature_vector::euclidean_distance;
use crate::core::{Prediction, RasterImage};
use crate::error::{Result, SketchError};
use crate::features::{FeatureExtractor, GridFeatureExtractor};
use crate::storage::ExampleStore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_TEMPERATURE: f64 = 1.0;

fn default_temperature() -> f64 {
    DEFAULT_TEMPERATURE
}

/// One mean descriptor per label.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CentroidModel {
    pub grid_side: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    pub prototypes: BTreeMap<String, Vec<f64>>,
}

impl CentroidModel {
    /// Averages the descriptors of each label's original (non-augmented)
    /// examples. Labels holding only augmented copies average those instead.
    pub fn from_store(
        store: &ExampleStore,
        extractor: &GridFeatureExtractor,
        temperature: f64,
    ) -> Self {
        let dim = extractor.dimension();
        let mut prototypes = BTreeMap::new();

        for label in store.labels() {
            let examples = store.examples_for(label);
            let originals: Vec<_> = examples.iter().filter(|e| e.origin().is_original()).collect();
            let pool: Vec<_> = if originals.is_empty() {
                examples.iter().collect()
            } else {
                originals
            };

            let mut sum = vec![0.0; dim];
            for ex in &pool {
                let v = extractor.extract(ex.image());
                for (s, x) in sum.iter_mut().zip(v.as_slice()) {
                    *s += x;
                }
            }
            let n = pool.len().max(1) as f64;
            sum.iter_mut().for_each(|s| *s /= n);
            prototypes.insert(label.to_string(), sum);
        }

        Self {
            grid_side: extractor.side(),
            temperature,
            prototypes,
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let model: CentroidModel = serde_json::from_str(&raw)?;
        model.validate()?;
        Ok(model)
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(self)?;
        fs::write(path, bytes)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_GRID_SIDE).contains(&self.grid_side) {
            return Err(SketchError::Scorer(format!(
                "grid_side must be in 1..={MAX_GRID_SIDE}, got {}",
                self.grid_side
            )));
        }
        if !self.temperature.is_finite() || self.temperature <= 0.0 {
            return Err(SketchError::Scorer(format!(
                "temperature must be positive, got {}",
                self.temperature
            )));
        }
        let dim = self
            .grid_side
            .checked_mul(self.grid_side)
            .ok_or_else(|| SketchError::Scorer("grid_side too large".to_string()))?
            as usize;
        for (label, proto) in &self.prototypes {
            if label.is_empty() {
                return Err(SketchError::Scorer("empty label in model".to_string()));
            }
            if proto.len() != dim {
                return Err(SketchError::Scorer(format!(
                    "prototype '{label}' has {} values, expected {dim}",
                    proto.len()
                )));
            }
        }
        Ok(())
    }

    /// Closest prototype, with its softmax share over negative distances.
    pub fn predict(&self, features: &[f64]) -> Option<Prediction> {
        let distances: Vec<(&str, f64)> = self
            .prototypes
            .iter()
            .map(|(l, p)| (l.as_str(), euclidean_distance(features, p)))
            .collect();

        let (best_label, best) = distances
            .iter()
            .copied()
            .min_by(|a, b| a.1.total_cmp(&b.1))?;

        let z: f64 = distances
            .iter()
            .map(|(_, d)| (-(d - best) / self.temperature).exp())
            .sum();

        Some(Prediction::new(best_label, 1.0 / z))
    }
}

/// Nearest-centroid scorer backed by a model file on disk.
pub struct CentroidScorer {
    path: PathBuf,
    model: CentroidModel,
    extractor: GridFeatureExtractor,
}

impl CentroidScorer {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let model = CentroidModel::from_file(&path)?;
        info!(
            path = %path.display(),
            labels = model.prototypes.len(),
            grid_side = model.grid_side,
            "loaded centroid model"
        );
        Ok(Self {
            extractor: GridFeatureExtractor::new(model.grid_side),
            path,
            model,
        })
    }

    pub fn model(&self) -> &CentroidModel {
        &self.model
    }
}

impl Scorer for CentroidScorer {
    fn score(&self, image: &RasterImage) -> Result<Option<Prediction>> {
        let features = self.extractor.extract(image);
        Ok(self.model.predict(features.as_slice()))
    }

    fn reload(&mut self) -> Result<()> {
        let model = CentroidModel::from_file(&self.path)?;
        self.extractor = GridFeatureExtractor::new(model.grid_side);
        self.model = model;
        Ok(())
    }

    fn name(&self) -> &str {
        "centroid"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BLACK, ExampleOrigin, LabeledExample, WHITE};
    use tempfile::tempdir;

    fn top_half() -> RasterImage {
        RasterImage::from_fn(8, 8, |_, y| if y < 4 { BLACK } else { WHITE })
    }

    fn left_half() -> RasterImage {
        RasterImage::from_fn(8, 8, |x, _| if x < 4 { BLACK } else { WHITE })
    }

    fn trained_model() -> CentroidModel {
        let fx = GridFeatureExtractor::new(2);
        let mut store = ExampleStore::new();
        store.add_batch(vec![
            LabeledExample::new("top", top_half(), ExampleOrigin::Original, &fx),
            LabeledExample::new("left", left_half(), ExampleOrigin::Original, &fx),
        ]);
        CentroidModel::from_store(&store, &fx, 0.5)
    }

    #[test]
    fn from_store_averages_originals() {
        let model = trained_model();
        assert_eq!(model.grid_side, 2);
        assert_eq!(model.prototypes["top"], vec![1.0, 1.0, 0.0, 0.0]);
        assert_eq!(model.prototypes["left"], vec![1.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn predict_picks_closest_prototype() {
        let model = trained_model();
        let p = model.predict(&[1.0, 1.0, 0.0, 0.0]).unwrap();
        assert_eq!(p.label, "top");
        assert!(p.confidence > 0.5 && p.confidence <= 1.0);
    }

    #[test]
    fn equidistant_prototypes_split_confidence() {
        let model = trained_model();
        let p = model.predict(&[1.0, 0.5, 0.5, 0.0]).unwrap();
        assert!((p.confidence - 0.5).abs() < 1e-12);
    }

    #[test]
    fn empty_model_has_no_opinion() {
        let model = CentroidModel {
            grid_side: 2,
            temperature: 1.0,
            prototypes: BTreeMap::new(),
        };
        assert!(model.predict(&[0.0; 4]).is_none());
    }

    #[test]
    fn validate_catches_dimension_mismatch() {
        let mut model = trained_model();
        model.prototypes.insert("bad".into(), vec![0.0; 3]);
        assert!(matches!(model.validate(), Err(SketchError::Scorer(_))));
    }

    #[test]
    fn validate_rejects_oversized_grid() {
        for side in [0, MAX_GRID_SIDE + 1, 60_000, 70_000] {
            let model = CentroidModel {
                grid_side: side,
                temperature: 1.0,
                prototypes: BTreeMap::new(),
            };
            assert!(matches!(model.validate(), Err(SketchError::Scorer(_))));
        }
    }

    #[test]
    fn scorer_loads_and_reloads_from_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.json");
        trained_model().write_to(&path).unwrap();

        let mut scorer = CentroidScorer::load(&path).unwrap();
        let p = scorer.score(&top_half()).unwrap().unwrap();
        assert_eq!(p.label, "top");

        let mut replaced = trained_model();
        replaced.prototypes.remove("top");
        replaced.write_to(&path).unwrap();
        scorer.reload().unwrap();
        let p = scorer.score(&top_half()).unwrap().unwrap();
        assert_eq!(p.label, "left");
        assert_eq!(p.confidence, 1.0);
    }

    #[test]
    fn load_missing_model_fails() {
        let dir = tempdir().unwrap();
        let res = CentroidScorer::load(dir.path().join("nope.json"));
        assert!(matches!(res, Err(SketchError::Io(_))));
    }
}
