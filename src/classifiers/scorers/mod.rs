mod centroid_scorer;
mod scorer;

pub use centroid_scorer::{CentroidModel, CentroidScorer, DEFAULT_TEMPERATURE};
pub use scorer::Scorer;
