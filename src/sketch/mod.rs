//! Turning drawings into rasters: stroke documents and ASCII grids.

mod ascii;
mod loader;
mod strokes;

pub use ascii::{DEFAULT_CELL_SIZE, parse_ascii_sketch};
pub use loader::load_sketch;
pub use strokes::StrokeSketch;
