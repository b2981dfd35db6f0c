mod knn_classifier;
mod neighbor;

pub use knn_classifier::{KnnClassifier, vote};
pub use neighbor::Neighbor;
