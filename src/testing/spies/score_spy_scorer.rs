use crate::classifiers::Scorer;
use crate::core::{Prediction, RasterImage};
use crate::error::Result;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

#[derive(Default)]
struct Counters {
    score: AtomicU64,
    reload: AtomicU64,
}

pub struct ScoreSpyHandle(Arc<Counters>);

impl ScoreSpyHandle {
    pub fn score_calls(&self) -> u64 {
        self.0.score.load(Ordering::Relaxed)
    }

    pub fn reload_calls(&self) -> u64 {
        self.0.reload.load(Ordering::Relaxed)
    }
}

pub struct ScoreSpyScorer {
    counters: Arc<Counters>,
    answer: Option<Prediction>,
}

impl ScoreSpyScorer {
    pub fn new(answer: Option<Prediction>) -> (Self, ScoreSpyHandle) {
        let counters = Arc::new(Counters::default());
        (
            Self {
                counters: counters.clone(),
                answer,
            },
            ScoreSpyHandle(counters),
        )
    }
}

impl Scorer for ScoreSpyScorer {
    fn score(&self, _image: &RasterImage) -> Result<Option<Prediction>> {
        self.counters.score.fetch_add(1, Ordering::Relaxed);
        Ok(self.answer.clone())
    }

    fn reload(&mut self) -> Result<()> {
        self.counters.reload.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn name(&self) -> &str {
        "spy"
    }
}
