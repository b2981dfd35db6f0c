pub mod hybrid_dispatcher;
pub mod knn;
pub mod scorers;

pub use hybrid_dispatcher::{Classification, HybridDispatcher, PredictionSource};
pub use knn::{KnnClassifier, Neighbor};
pub use scorers::{CentroidModel, CentroidScorer, Scorer};
