mod service;
mod sketch_engine;

pub use service::{Pending, SketchService};
pub use sketch_engine::{ModelState, SketchEngine};
