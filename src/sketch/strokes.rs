use crate::core::{BLACK, RasterImage, Rgba, WHITE};
use crate::error::{Result, SketchError};
use serde::{Deserialize, Serialize};

fn default_line_width() -> f64 {
    3.0
}

/// Freehand drawing as captured by a canvas: polylines in pixel coordinates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StrokeSketch {
    pub width: u32,
    pub height: u32,
    #[serde(default = "default_line_width")]
    pub line_width: f64,
    pub strokes: Vec<Vec<[f64; 2]>>,
}

impl StrokeSketch {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            line_width: default_line_width(),
            strokes: Vec::new(),
        }
    }

    pub fn with_line_width(mut self, line_width: f64) -> Self {
        self.line_width = line_width;
        self
    }

    pub fn stroke(mut self, points: &[(f64, f64)]) -> Self {
        self.strokes
            .push(points.iter().map(|&(x, y)| [x, y]).collect());
        self
    }

    /// Black ink on an opaque white canvas.
    pub fn rasterize(&self) -> Result<RasterImage> {
        if !self.line_width.is_finite() || self.line_width <= 0.0 {
            return Err(SketchError::InvalidImage(format!(
                "line width must be positive, got {}",
                self.line_width
            )));
        }

        let (w, h) = (self.width as usize, self.height as usize);
        let mut pixels: Vec<Rgba> = vec![WHITE; w * h];
        let radius = self.line_width / 2.0;

        for stroke in &self.strokes {
            match stroke.as_slice() {
                [] => {}
                [p] => stamp_segment(&mut pixels, w, h, *p, *p, radius),
                points => {
                    for pair in points.windows(2) {
                        stamp_segment(&mut pixels, w, h, pair[0], pair[1], radius);
                    }
                }
            }
        }

        RasterImage::new(self.width, self.height, pixels)
    }
}

fn stamp_segment(pixels: &mut [Rgba], w: usize, h: usize, a: [f64; 2], b: [f64; 2], radius: f64) {
    if w == 0 || h == 0 {
        return;
    }
    let min_x = (a[0].min(b[0]) - radius).floor().max(0.0) as usize;
    let min_y = (a[1].min(b[1]) - radius).floor().max(0.0) as usize;
    let max_x = ((a[0].max(b[0]) + radius).ceil().max(0.0) as usize).min(w - 1);
    let max_y = ((a[1].max(b[1]) + radius).ceil().max(0.0) as usize).min(h - 1);

    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let c = [x as f64 + 0.5, y as f64 + 0.5];
            if distance_to_segment(c, a, b) <= radius {
                pixels[y * w + x] = BLACK;
            }
        }
    }
}

fn distance_to_segment(p: [f64; 2], a: [f64; 2], b: [f64; 2]) -> f64 {
    let (abx, aby) = (b[0] - a[0], b[1] - a[1]);
    let len2 = abx * abx + aby * aby;
    let t = if len2 == 0.0 {
        0.0
    } else {
        (((p[0] - a[0]) * abx + (p[1] - a[1]) * aby) / len2).clamp(0.0, 1.0)
    };
    let (dx, dy) = (p[0] - (a[0] + t * abx), p[1] - (a[1] + t * aby));
    (dx * dx + dy * dy).sqrt()
}
