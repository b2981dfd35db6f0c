use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Per-label example counts. Derived from the example store; only the store
/// builds one.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ModelStats {
    counts: BTreeMap<String, usize>,
}

impl ModelStats {
    pub(crate) fn from_counts(counts: BTreeMap<String, usize>) -> Self {
        Self { counts }
    }

    pub fn get(&self, label: &str) -> Option<usize> {
        self.counts.get(label).copied()
    }

    pub fn total_examples(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn label_count(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl Display for ModelStats {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "labels={}, examples={}",
            self.label_count(),
            self.total_examples()
        )?;
        for (label, n) in &self.counts {
            write!(f, ", {label}={n}")?;
        }
        Ok(())
    }
}
