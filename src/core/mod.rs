pub mod feature_vector;
pub mod labeled_example;
pub mod model_stats;
pub mod prediction;
pub mod raster_image;

pub use feature_vector::FeatureVector;
pub use labeled_example::{ExampleOrigin, LabeledExample};
pub use model_stats::ModelStats;
pub use prediction::{Prediction, ScoredPrediction};
pub use raster_image::{BLACK, RasterImage, Rgba, TRANSPARENT, WHITE};
