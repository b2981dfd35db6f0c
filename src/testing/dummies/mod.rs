mod failing_scorer;

pub use failing_scorer::FailingScorer;
