mod dummies;
pub mod fixtures;
mod spies;
mod stubs;

pub use dummies::FailingScorer;
pub use spies::{ScoreSpyHandle, ScoreSpyScorer};
pub use stubs::FixedScorer;
