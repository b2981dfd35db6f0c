use crate::augmentation::Augmenter;
use crate::classifiers::{
    CentroidScorer, Classification, HybridDispatcher, KnnClassifier, Neighbor, Scorer,
};
use crate::config::{EngineConfig, ScorerChoice};
use crate::core::{ExampleOrigin, LabeledExample, ModelStats, RasterImage, ScoredPrediction};
use crate::error::Result;
use crate::features::{FeatureExtractor, GridFeatureExtractor};
use crate::storage::{ExamplePersistence, ExampleStore, JsonFilePersistence, NullPersistence};
use std::sync::mpsc::{Receiver, Sender, channel};
use strum_macros::Display;
use tracing::{debug, info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ModelState {
    Untrained,
    Trained,
}

/// The classify / teach / stats / reset surface.
///
/// Not synchronized: `classify` borrows shared, `teach` and `reset` borrow
/// exclusively. Hosts that need a background queue wrap the engine in
/// [`SketchService`](crate::engine::SketchService).
pub struct SketchEngine {
    extractor: GridFeatureExtractor,
    augmenter: Augmenter,
    store: ExampleStore,
    dispatcher: HybridDispatcher,
    persistence: Box<dyn ExamplePersistence>,
    observers: Vec<Sender<ModelStats>>,
}

impl SketchEngine {
    /// Builds every component from `config` and restores the saved store, if
    /// any. A scorer that fails to load is skipped with a warning; a store
    /// that fails to load is an error.
    pub fn new(config: &EngineConfig) -> Result<Self> {
        config.validate()?;

        let knn = KnnClassifier::new(config.k)?;
        let mut dispatcher =
            HybridDispatcher::new(knn).with_threshold(config.confidence_threshold);

        if let ScorerChoice::Centroid(params) = &config.scorer {
            match CentroidScorer::load(&params.path) {
                Ok(scorer) => dispatcher = dispatcher.with_scorer(Box::new(scorer)),
                Err(e) => warn!(
                    path = %params.path.display(),
                    error = %e,
                    "could not load scorer, continuing with k-NN only"
                ),
            }
        }

        let persistence: Box<dyn ExamplePersistence> = match &config.store_path {
            Some(path) => Box::new(JsonFilePersistence::new(path)),
            None => Box::new(NullPersistence),
        };

        let mut engine = Self {
            extractor: GridFeatureExtractor::new(config.grid_side),
            augmenter: Augmenter::from_params(&config.augmentation),
            store: ExampleStore::new(),
            dispatcher,
            persistence,
            observers: Vec::new(),
        };
        engine.restore()?;

        info!(
            grid_side = config.grid_side,
            k = config.k,
            scorer = %config.scorer_kind(),
            store = %engine.persistence.describe(),
            "engine ready ({})",
            engine.store.stats()
        );
        Ok(engine)
    }

    pub fn with_scorer(mut self, scorer: Box<dyn Scorer>) -> Self {
        self.dispatcher = self.dispatcher.with_scorer(scorer);
        self
    }

    /// Swaps the storage backend and reloads the store from it.
    pub fn with_persistence(mut self, persistence: Box<dyn ExamplePersistence>) -> Result<Self> {
        self.persistence = persistence;
        self.restore()?;
        Ok(self)
    }

    pub fn classify(&self, image: &RasterImage) -> ScoredPrediction {
        self.classify_detailed(image).prediction
    }

    pub fn classify_detailed(&self, image: &RasterImage) -> Classification {
        let c = self
            .dispatcher
            .classify(image, &self.store, &self.extractor);
        debug!(source = %c.source, result = %c.prediction, "classified sketch");
        c
    }

    /// The `n` closest stored examples, for diagnostics.
    pub fn neighbors(&self, image: &RasterImage, n: usize) -> Vec<Neighbor<'_>> {
        let query = self.extractor.extract(image);
        let mut ranked = self.dispatcher.knn().rank(&self.store, &query);
        ranked.truncate(n);
        ranked
    }

    pub fn teach(&mut self, image: &RasterImage, label: &str) -> usize {
        self.teach_many(std::slice::from_ref(image), label)
    }

    /// Stores every image and its augmentations under `label`. Returns the
    /// number of examples added; an empty label or no images adds nothing.
    pub fn teach_many(&mut self, images: &[RasterImage], label: &str) -> usize {
        if label.is_empty() {
            warn!("ignoring teach request with an empty label");
            return 0;
        }
        if images.is_empty() {
            warn!(label, "ignoring teach request without images");
            return 0;
        }

        let mut batch = Vec::with_capacity(images.len() * (self.augmenter.plan().len() + 1));
        for image in images {
            batch.push(LabeledExample::new(
                label,
                image.clone(),
                ExampleOrigin::Original,
                &self.extractor,
            ));
            for (transform, variant) in self.augmenter.augment(image) {
                batch.push(LabeledExample::new(
                    label,
                    variant,
                    ExampleOrigin::Augmented { transform },
                    &self.extractor,
                ));
            }
        }

        let added = self.store.add_batch(batch);
        info!(
            label,
            added,
            total = self.store.stats().get(label).unwrap_or(0),
            "taught sketch"
        );
        self.after_mutation();
        added
    }

    pub fn stats(&self) -> &ModelStats {
        self.store.stats()
    }

    pub fn state(&self) -> ModelState {
        if self.store.is_empty() {
            ModelState::Untrained
        } else {
            ModelState::Trained
        }
    }

    /// Forgets every taught example and puts the scorer back in its
    /// as-loaded state.
    pub fn reset(&mut self) {
        let dropped = self.store.len();
        self.store.clear();
        self.dispatcher.reload_scorer();
        info!(dropped, "reset model");
        self.after_mutation();
    }

    /// Every later mutation pushes the fresh stats down the returned channel.
    pub fn subscribe(&mut self) -> Receiver<ModelStats> {
        let (tx, rx) = channel();
        self.observers.push(tx);
        rx
    }

    pub fn save(&self) -> Result<()> {
        self.persistence.save(&self.store)
    }

    pub fn store(&self) -> &ExampleStore {
        &self.store
    }

    pub fn extractor(&self) -> &GridFeatureExtractor {
        &self.extractor
    }

    pub fn has_scorer(&self) -> bool {
        self.dispatcher.has_scorer()
    }

    fn restore(&mut self) -> Result<()> {
        let stored = self.persistence.load()?;
        let mut batch = Vec::with_capacity(stored.len());
        for ex in stored {
            if ex.label.is_empty() {
                warn!("skipping stored example with an empty label");
                continue;
            }
            batch.push(LabeledExample::new(
                ex.label,
                ex.image,
                ex.origin,
                &self.extractor,
            ));
        }
        self.store.clear();
        self.store.add_batch(batch);
        Ok(())
    }

    fn after_mutation(&mut self) {
        let stats = self.store.stats().clone();
        self.observers.retain(|tx| tx.send(stats.clone()).is_ok());

        if let Err(e) = self.persistence.save(&self.store) {
            warn!(
                store = %self.persistence.describe(),
                error = %e,
                "failed to save example store"
            );
        }
    }
}
