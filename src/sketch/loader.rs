use crate::core::RasterImage;
use crate::error::Result;
use crate::sketch::{DEFAULT_CELL_SIZE, StrokeSketch, parse_ascii_sketch};
use std::fs;
use std::path::Path;

/// `.json` files are stroke documents; anything else is an ASCII grid.
pub fn load_sketch(path: &Path) -> Result<RasterImage> {
    let text = fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    if is_json {
        let sketch: StrokeSketch = serde_json::from_str(&text)?;
        sketch.rasterize()
    } else {
        parse_ascii_sketch(&text, DEFAULT_CELL_SIZE)
    }
}
