use crate::core::{LabeledExample, ModelStats};
use std::collections::BTreeMap;

/// Taught examples grouped by label, plus the counts derived from them.
///
/// Labels are kept sorted so iteration order, and therefore tie handling in
/// the classifier, is the same on every run.
#[derive(Debug, Default)]
pub struct ExampleStore {
    examples: BTreeMap<String, Vec<LabeledExample>>,
    stats: ModelStats,
}

impl ExampleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends every example under its own label. Stats are recomputed once,
    /// after the whole batch is in.
    pub fn add_batch(&mut self, batch: Vec<LabeledExample>) -> usize {
        let added = batch.len();
        if added == 0 {
            return 0;
        }
        for example in batch {
            self.examples
                .entry(example.label().to_string())
                .or_default()
                .push(example);
        }
        self.recompute_stats();
        added
    }

    pub fn clear(&mut self) {
        self.examples.clear();
        self.recompute_stats();
    }

    pub fn stats(&self) -> &ModelStats {
        &self.stats
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    pub fn len(&self) -> usize {
        self.stats.total_examples()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.examples.keys().map(String::as_str)
    }

    pub fn examples_for(&self, label: &str) -> &[LabeledExample] {
        self.examples.get(label).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All examples, label by label, insertion order within a label.
    pub fn iter(&self) -> impl Iterator<Item = &LabeledExample> {
        self.examples.values().flatten()
    }

    fn recompute_stats(&mut self) {
        let counts = self
            .examples
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, v)| (k.clone(), v.len()))
            .collect();
        self.stats = ModelStats::from_counts(counts);
    }
}
