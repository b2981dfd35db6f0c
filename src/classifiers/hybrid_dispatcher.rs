use crate::classifiers::knn::KnnClassifier;
use crate::classifiers::scorers::Scorer;
use crate::config::DEFAULT_CONFIDENCE_THRESHOLD;
use crate::core::{Prediction, RasterImage, ScoredPrediction};
use crate::features::FeatureExtractor;
use crate::storage::ExampleStore;
use serde::Serialize;
use strum_macros::{Display, IntoStaticStr};
use tracing::{debug, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Display, IntoStaticStr)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum PredictionSource {
    Scorer,
    NearestNeighbors,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Classification {
    pub prediction: ScoredPrediction,
    pub source: PredictionSource,
}

/// Puts an optional pre-trained scorer in front of the k-NN vote.
///
/// The scorer's answer is used only when it is strictly more confident than
/// `threshold`; anything else (no scorer, an error, no opinion, a weak or
/// out-of-range confidence) falls through to nearest neighbors.
pub struct HybridDispatcher {
    scorer: Option<Box<dyn Scorer>>,
    knn: KnnClassifier,
    threshold: f64,
}

impl HybridDispatcher {
    pub fn new(knn: KnnClassifier) -> Self {
        Self {
            scorer: None,
            knn,
            threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }

    pub fn with_scorer(mut self, scorer: Box<dyn Scorer>) -> Self {
        self.scorer = Some(scorer);
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn has_scorer(&self) -> bool {
        self.scorer.is_some()
    }

    pub fn knn(&self) -> &KnnClassifier {
        &self.knn
    }

    pub fn classify(
        &self,
        image: &RasterImage,
        store: &ExampleStore,
        extractor: &dyn FeatureExtractor,
    ) -> Classification {
        if let Some(p) = self.confident_scorer_answer(image) {
            return Classification {
                prediction: p.into(),
                source: PredictionSource::Scorer,
            };
        }

        let query = extractor.extract(image);
        let prediction = self.knn.classify(store, &query);
        debug!(
            examples = store.len(),
            k = self.knn.k(),
            result = %prediction,
            "k-NN fallback"
        );
        Classification {
            prediction,
            source: PredictionSource::NearestNeighbors,
        }
    }

    /// Reloads the scorer. A scorer that cannot be reloaded is dropped.
    pub fn reload_scorer(&mut self) {
        let Some(scorer) = self.scorer.as_mut() else {
            return;
        };
        if let Err(e) = scorer.reload() {
            warn!(scorer = scorer.name(), error = %e, "scorer reload failed, disabling it");
            self.scorer = None;
        }
    }

    fn confident_scorer_answer(&self, image: &RasterImage) -> Option<Prediction> {
        let scorer = self.scorer.as_ref()?;
        match scorer.score(image) {
            Ok(Some(p)) if !p.has_valid_confidence() => {
                warn!(
                    scorer = scorer.name(),
                    confidence = p.confidence,
                    "scorer confidence outside [0, 1], ignoring"
                );
                None
            }
            Ok(Some(p)) if p.confidence > self.threshold => {
                debug!(scorer = scorer.name(), label = %p.label, confidence = p.confidence, "scorer answer accepted");
                Some(p)
            }
            Ok(Some(p)) => {
                debug!(
                    scorer = scorer.name(),
                    confidence = p.confidence,
                    threshold = self.threshold,
                    "scorer not confident enough"
                );
                None
            }
            Ok(None) => None,
            Err(e) => {
                warn!(scorer = scorer.name(), error = %e, "scorer failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BLACK, ExampleOrigin, LabeledExample, WHITE};
    use crate::features::GridFeatureExtractor;
    use crate::testing::{FailingScorer, FixedScorer, ScoreSpyScorer};

    fn sketch() -> RasterImage {
        RasterImage::from_fn(8, 8, |x, y| if x == y { BLACK } else { WHITE })
    }

    fn store_with_one(label: &str) -> (ExampleStore, GridFeatureExtractor) {
        let fx = GridFeatureExtractor::new(4);
        let mut store = ExampleStore::new();
        store.add_batch(vec![LabeledExample::new(
            label,
            sketch(),
            ExampleOrigin::Original,
            &fx,
        )]);
        (store, fx)
    }

    fn dispatcher() -> HybridDispatcher {
        HybridDispatcher::new(KnnClassifier::new(3).unwrap())
    }

    #[test]
    fn confident_scorer_wins() {
        let (store, fx) = store_with_one("knn-label");
        let d = dispatcher().with_scorer(Box::new(FixedScorer::answering("cat", 0.9)));
        let c = d.classify(&sketch(), &store, &fx);
        assert_eq!(c.source, PredictionSource::Scorer);
        assert_eq!(c.prediction, ScoredPrediction::some("cat", 0.9));
    }

    #[test]
    fn threshold_is_exclusive() {
        let (store, fx) = store_with_one("knn-label");
        let d = dispatcher().with_scorer(Box::new(FixedScorer::answering("cat", 0.4)));
        let c = d.classify(&sketch(), &store, &fx);
        assert_eq!(c.source, PredictionSource::NearestNeighbors);
        assert_eq!(c.prediction.label(), Some("knn-label"));
    }

    #[test]
    fn absent_scorer_falls_back() {
        let (store, fx) = store_with_one("knn-label");
        let c = dispatcher().classify(&sketch(), &store, &fx);
        assert_eq!(c.source, PredictionSource::NearestNeighbors);
        assert_eq!(c.prediction, ScoredPrediction::some("knn-label", 1.0));
    }

    #[test]
    fn failing_scorer_falls_back() {
        let (store, fx) = store_with_one("knn-label");
        let d = dispatcher().with_scorer(Box::new(FailingScorer));
        let c = d.classify(&sketch(), &store, &fx);
        assert_eq!(c.prediction.label(), Some("knn-label"));
    }

    #[test]
    fn silent_scorer_on_empty_store_yields_nothing() {
        let fx = GridFeatureExtractor::new(4);
        let d = dispatcher().with_scorer(Box::new(FixedScorer::silent()));
        let c = d.classify(&sketch(), &ExampleStore::new(), &fx);
        assert!(c.prediction.is_none());
        assert_eq!(c.source, PredictionSource::NearestNeighbors);
    }

    #[test]
    fn out_of_range_confidence_is_ignored() {
        let (store, fx) = store_with_one("knn-label");
        let d = dispatcher().with_scorer(Box::new(FixedScorer::answering("cat", 1.7)));
        let c = d.classify(&sketch(), &store, &fx);
        assert_eq!(c.prediction.label(), Some("knn-label"));

        let d = dispatcher().with_scorer(Box::new(FixedScorer::answering("cat", f64::NAN)));
        let c = d.classify(&sketch(), &store, &fx);
        assert_eq!(c.prediction.label(), Some("knn-label"));
    }

    #[test]
    fn custom_threshold_applies() {
        let (store, fx) = store_with_one("knn-label");
        let d = dispatcher()
            .with_threshold(0.95)
            .with_scorer(Box::new(FixedScorer::answering("cat", 0.9)));
        let c = d.classify(&sketch(), &store, &fx);
        assert_eq!(c.source, PredictionSource::NearestNeighbors);
    }

    #[test]
    fn scorer_is_asked_once_per_classification() {
        let (store, fx) = store_with_one("knn-label");
        let (spy, handle) = ScoreSpyScorer::new(None);
        let d = dispatcher().with_scorer(Box::new(spy));
        for _ in 0..3 {
            d.classify(&sketch(), &store, &fx);
        }
        assert_eq!(handle.score_calls(), 3);
    }

    #[test]
    fn failed_reload_disables_scorer() {
        let mut d = dispatcher().with_scorer(Box::new(FailingScorer));
        d.reload_scorer();
        assert!(!d.has_scorer());

        let (spy, handle) = ScoreSpyScorer::new(None);
        let mut d = dispatcher().with_scorer(Box::new(spy));
        d.reload_scorer();
        assert!(d.has_scorer());
        assert_eq!(handle.reload_calls(), 1);
    }

    #[test]
    fn source_names_are_kebab_case() {
        assert_eq!(PredictionSource::NearestNeighbors.to_string(), "nearest-neighbors");
        let s: &'static str = PredictionSource::Scorer.into();
        assert_eq!(s, "scorer");
    }
}
