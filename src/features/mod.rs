mod feature_extractor;

pub use feature_extractor::{DEFAULT_GRID_SIDE, FeatureExtractor, GridFeatureExtractor};
