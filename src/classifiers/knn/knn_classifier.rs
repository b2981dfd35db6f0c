use crate::classifiers::knn::Neighbor;
use crate::config::DEFAULT_K;
use crate::core::{FeatureVector, Prediction, ScoredPrediction};
use crate::error::{Result, SketchError};
use crate::storage::ExampleStore;
use std::cmp::Ordering;

/// Brute-force k-nearest-neighbor vote over every stored example.
///
/// Ties are settled deterministically:
/// - equal distances rank by label, then by store order;
/// - equal vote counts go to the label whose closest neighbor ranks first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KnnClassifier {
    k: usize,
}

impl KnnClassifier {
    pub fn new(k: usize) -> Result<Self> {
        if k == 0 {
            return Err(SketchError::InvalidConfiguration(
                "k must be > 0".to_string(),
            ));
        }
        Ok(Self { k })
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// Every stored example ranked by distance to `query`, closest first.
    pub fn rank<'s>(&self, store: &'s ExampleStore, query: &FeatureVector) -> Vec<Neighbor<'s>> {
        let mut ranked: Vec<Neighbor<'s>> = store
            .iter()
            .map(|ex| Neighbor {
                label: ex.label(),
                distance: ex.features().distance(query),
            })
            .collect();

        ranked.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then_with(|| a.label.cmp(b.label))
        });
        ranked
    }

    /// The `min(k, len)` closest examples.
    pub fn nearest<'s>(&self, store: &'s ExampleStore, query: &FeatureVector) -> Vec<Neighbor<'s>> {
        let mut ranked = self.rank(store, query);
        ranked.truncate(self.k);
        ranked
    }

    pub fn classify(&self, store: &ExampleStore, query: &FeatureVector) -> ScoredPrediction {
        if store.is_empty() {
            return ScoredPrediction::none();
        }
        vote(&self.nearest(store, query)).into()
    }
}

impl Default for KnnClassifier {
    fn default() -> Self {
        Self { k: DEFAULT_K }
    }
}

/// Majority vote over an already ranked neighbor list. Confidence is the
/// winner's share of the neighbors considered.
pub fn vote(neighbors: &[Neighbor<'_>]) -> Option<Prediction> {
    if neighbors.is_empty() {
        return None;
    }

    // (label, votes, rank of first appearance)
    let mut tally: Vec<(&str, usize, usize)> = Vec::new();
    for (rank, n) in neighbors.iter().enumerate() {
        match tally.iter_mut().find(|(label, _, _)| *label == n.label) {
            Some(entry) => entry.1 += 1,
            None => tally.push((n.label, 1, rank)),
        }
    }

    let (label, votes, _) = tally.into_iter().max_by(|a, b| match a.1.cmp(&b.1) {
        Ordering::Equal => b.2.cmp(&a.2),
        other => other,
    })?;

    Some(Prediction::new(
        label,
        votes as f64 / neighbors.len() as f64,
    ))
}
