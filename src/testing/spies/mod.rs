mod score_spy_scorer;

pub use score_spy_scorer::{ScoreSpyHandle, ScoreSpyScorer};
