mod fixed_scorer;

pub use fixed_scorer::FixedScorer;
