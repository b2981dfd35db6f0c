//! An incrementally teachable sketch classifier.
//!
//! Sketches are reduced to a 16×16 ink-density descriptor and matched against
//! user-taught examples with a k-nearest-neighbor vote. An optional
//! pre-trained [`Scorer`](classifiers::Scorer) is consulted first and kept
//! only when it is confident.

pub mod augmentation;
pub mod classifiers;
pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod features;
pub mod sketch;
pub mod storage;
pub mod ui;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use config::EngineConfig;
pub use engine::{ModelState, SketchEngine, SketchService};
pub use error::{Result, SketchError};
