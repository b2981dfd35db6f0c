use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    pub confidence: f64,
}

impl Prediction {
    pub fn new(label: impl Into<String>, confidence: f64) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }

    #[inline]
    pub fn has_valid_confidence(&self) -> bool {
        (0.0..=1.0).contains(&self.confidence)
    }
}

/// Outcome of a classification: either a label with its confidence, or
/// nothing at all ("cannot classify yet").
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoredPrediction(Option<Prediction>);

impl ScoredPrediction {
    pub fn none() -> Self {
        Self(None)
    }

    pub fn some(label: impl Into<String>, confidence: f64) -> Self {
        Self(Some(Prediction::new(label, confidence)))
    }

    pub fn label(&self) -> Option<&str> {
        self.0.as_ref().map(|p| p.label.as_str())
    }

    pub fn confidence(&self) -> Option<f64> {
        self.0.as_ref().map(|p| p.confidence)
    }

    pub fn is_none(&self) -> bool {
        self.0.is_none()
    }

    pub fn as_prediction(&self) -> Option<&Prediction> {
        self.0.as_ref()
    }
}

impl From<Prediction> for ScoredPrediction {
    fn from(p: Prediction) -> Self {
        Self(Some(p))
    }
}

impl From<Option<Prediction>> for ScoredPrediction {
    fn from(p: Option<Prediction>) -> Self {
        Self(p)
    }
}

impl fmt::Display for ScoredPrediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(p) => write!(f, "{} ({:.1}%)", p.label, p.confidence * 100.0),
            None => write!(f, "no prediction"),
        }
    }
}
