use crate::core::{BLACK, RasterImage, WHITE};
use crate::error::Result;

const INK: &[char] = &['#', 'X', 'x', '*', '@'];

pub const DEFAULT_CELL_SIZE: u32 = 8;

/// Reads a text grid where `#`, `X`, `x`, `*` and `@` are ink and anything else is
/// background. Each character becomes a `cell × cell` block of pixels.
pub fn parse_ascii_sketch(text: &str, cell: u32) -> Result<RasterImage> {
    let cell = cell.max(1);
    let mut rows: Vec<Vec<bool>> = text
        .lines()
        .map(|l| l.trim_end().chars().map(|c| INK.contains(&c)).collect())
        .collect();
    while rows.last().is_some_and(|r| r.is_empty()) {
        rows.pop();
    }

    let cols = rows.iter().map(Vec::len).max().unwrap_or(0) as u32;
    let lines = rows.len() as u32;

    let image = RasterImage::from_fn(cols * cell, lines * cell, |x, y| {
        let inked = rows
            .get((y / cell) as usize)
            .and_then(|r| r.get((x / cell) as usize))
            .copied()
            .unwrap_or(false);
        if inked { BLACK } else { WHITE }
    });
    Ok(image)
}
