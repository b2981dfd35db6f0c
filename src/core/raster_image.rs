use crate::error::SketchError;
use serde::{Deserialize, Serialize};

pub type Rgba = [u8; 4];

pub const TRANSPARENT: Rgba = [0, 0, 0, 0];
pub const WHITE: Rgba = [255, 255, 255, 255];
pub const BLACK: Rgba = [0, 0, 0, 255];

/// Owned RGBA pixel grid, row-major, 8 bits per channel.
///
/// A raster never changes after it has been built: every transform returns a
/// fresh image. Zero-sized rasters are allowed and stand for an empty canvas.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRaster", into = "RawRaster")]
pub struct RasterImage {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

#[derive(Serialize, Deserialize)]
struct RawRaster {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl TryFrom<RawRaster> for RasterImage {
    type Error = SketchError;

    fn try_from(raw: RawRaster) -> Result<Self, Self::Error> {
        RasterImage::new(raw.width, raw.height, raw.pixels)
    }
}

impl From<RasterImage> for RawRaster {
    fn from(image: RasterImage) -> Self {
        RawRaster {
            width: image.width,
            height: image.height,
            pixels: image.pixels,
        }
    }
}

impl RasterImage {
    pub fn new(width: u32, height: u32, pixels: Vec<Rgba>) -> Result<Self, SketchError> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(SketchError::InvalidImage(format!(
                "{width}x{height} raster needs {expected} pixels, got {}",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn from_fn<F>(width: u32, height: u32, mut f: F) -> Self
    where
        F: FnMut(u32, u32) -> Rgba,
    {
        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn filled(width: u32, height: u32, color: Rgba) -> Self {
        Self::from_fn(width, height, |_, _| color)
    }

    /// Opaque white canvas.
    pub fn blank(width: u32, height: u32) -> Self {
        Self::filled(width, height, WHITE)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x < self.width && y < self.height {
            self.pixels
                .get(y as usize * self.width as usize + x as usize)
                .copied()
        } else {
            None
        }
    }

    /// Color at `(x, y)` composited over a white background.
    pub fn opaque_rgb(&self, x: u32, y: u32) -> Option<[f64; 3]> {
        self.pixel(x, y).map(composite_over_white)
    }

    /// Unweighted mean of the composited channels, in `[0, 1]`.
    pub fn gray(&self, x: u32, y: u32) -> Option<f64> {
        self.opaque_rgb(x, y)
            .map(|[r, g, b]| ((r + g + b) / 3.0 / 255.0).clamp(0.0, 1.0))
    }

    /// Box-filtered resample to `new_width × new_height`, ignoring aspect
    /// ratio. The result is opaque (transparency is flattened onto white).
    ///
    /// Returns `None` when either the source or the target is zero-sized.
    pub fn resized(&self, new_width: u32, new_height: u32) -> Option<RasterImage> {
        if self.is_empty() || new_width == 0 || new_height == 0 {
            return None;
        }

        let step_x = self.width as f64 / new_width as f64;
        let step_y = self.height as f64 / new_height as f64;
        let samples_x = step_x.ceil().max(1.0) as u32;
        let samples_y = step_y.ceil().max(1.0) as u32;
        let per_cell = (samples_x * samples_y) as f64;

        Some(RasterImage::from_fn(new_width, new_height, |tx, ty| {
            let mut acc = [0.0f64; 3];
            for j in 0..samples_y {
                let sy = (ty as f64 + (j as f64 + 0.5) / samples_y as f64) * step_y;
                let py = (sy.floor() as u32).min(self.height - 1);
                for i in 0..samples_x {
                    let sx = (tx as f64 + (i as f64 + 0.5) / samples_x as f64) * step_x;
                    let px = (sx.floor() as u32).min(self.width - 1);
                    if let Some(rgb) = self.opaque_rgb(px, py) {
                        acc[0] += rgb[0];
                        acc[1] += rgb[1];
                        acc[2] += rgb[2];
                    }
                }
            }
            [
                channel(acc[0] / per_cell),
                channel(acc[1] / per_cell),
                channel(acc[2] / per_cell),
                255,
            ]
        }))
    }

    /// Rotates about the center by `degrees` (clockwise on a y-down raster).
    /// The canvas grows to bound the rotated content; uncovered pixels are
    /// transparent.
    pub fn rotated(&self, degrees: f64) -> Option<RasterImage> {
        if self.is_empty() || !degrees.is_finite() {
            return None;
        }

        let theta = degrees.to_radians();
        let (sin, cos) = theta.sin_cos();
        let w = self.width as f64;
        let h = self.height as f64;

        let new_w = bounding_extent(w * cos.abs() + h * sin.abs());
        let new_h = bounding_extent(w * sin.abs() + h * cos.abs());
        if new_w == 0 || new_h == 0 {
            return None;
        }

        let (cx, cy) = (new_w as f64 / 2.0, new_h as f64 / 2.0);
        let (ox, oy) = (w / 2.0, h / 2.0);

        Some(RasterImage::from_fn(new_w, new_h, |x, y| {
            let dx = x as f64 + 0.5 - cx;
            let dy = y as f64 + 0.5 - cy;
            let sx = dx * cos + dy * sin + ox;
            let sy = -dx * sin + dy * cos + oy;
            if sx >= 0.0 && sy >= 0.0 && sx < w && sy < h {
                self.pixel(sx as u32, sy as u32).unwrap_or(TRANSPARENT)
            } else {
                TRANSPARENT
            }
        }))
    }

    /// Uniform scale; the canvas takes the scaled dimensions (rounded).
    pub fn scaled(&self, factor: f64) -> Option<RasterImage> {
        if self.is_empty() || !factor.is_finite() || factor <= 0.0 {
            return None;
        }

        let new_w = (self.width as f64 * factor).round();
        let new_h = (self.height as f64 * factor).round();
        if new_w < 1.0 || new_h < 1.0 || new_w > u32::MAX as f64 || new_h > u32::MAX as f64 {
            return None;
        }
        let (new_w, new_h) = (new_w as u32, new_h as u32);

        let fx = self.width as f64 / new_w as f64;
        let fy = self.height as f64 / new_h as f64;

        Some(RasterImage::from_fn(new_w, new_h, |x, y| {
            let sx = (((x as f64 + 0.5) * fx) as u32).min(self.width - 1);
            let sy = (((y as f64 + 0.5) * fy) as u32).min(self.height - 1);
            self.pixel(sx, sy).unwrap_or(TRANSPARENT)
        }))
    }

    /// Shifts content by `(dx, dy)` pixels on the same canvas; pixels shifted
    /// in from outside are transparent.
    pub fn translated(&self, dx: i32, dy: i32) -> RasterImage {
        RasterImage::from_fn(self.width, self.height, |x, y| {
            let sx = x as i64 - dx as i64;
            let sy = y as i64 - dy as i64;
            if sx < 0 || sy < 0 {
                return TRANSPARENT;
            }
            self.pixel(sx as u32, sy as u32).unwrap_or(TRANSPARENT)
        })
    }
}

#[inline]
fn composite_over_white(px: Rgba) -> [f64; 3] {
    let alpha = px[3] as f64 / 255.0;
    let blend = |c: u8| c as f64 * alpha + 255.0 * (1.0 - alpha);
    [blend(px[0]), blend(px[1]), blend(px[2])]
}

#[inline]
fn channel(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

// Trig on axis-aligned angles leaves ~1e-16 residue; don't let it add a column.
#[inline]
fn bounding_extent(v: f64) -> u32 {
    (v - 1e-9).ceil().max(0.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() <= eps
    }

    #[test]
    fn new_rejects_wrong_pixel_count() {
        let err = RasterImage::new(2, 2, vec![WHITE; 3]).unwrap_err();
        assert!(matches!(err, SketchError::InvalidImage(_)));
    }

    #[test]
    fn zero_sized_raster_is_empty() {
        let img = RasterImage::new(0, 5, Vec::new()).unwrap();
        assert!(img.is_empty());
        assert!(img.pixel(0, 0).is_none());
        assert!(img.resized(16, 16).is_none());
        assert!(img.rotated(5.0).is_none());
        assert!(img.scaled(1.1).is_none());
    }

    #[test]
    fn transparent_reads_as_white_background() {
        let img = RasterImage::filled(1, 1, TRANSPARENT);
        assert!(approx(img.gray(0, 0).unwrap(), 1.0, 1e-12));

        let half = RasterImage::filled(1, 1, [0, 0, 0, 128]);
        let g = half.gray(0, 0).unwrap();
        assert!(g > 0.45 && g < 0.55, "gray={g}");
    }

    #[test]
    fn resize_averages_blocks() {
        // Left half black, right half white, 4x2 -> 2x1.
        let img = RasterImage::from_fn(4, 2, |x, _| if x < 2 { BLACK } else { WHITE });
        let small = img.resized(2, 1).unwrap();
        assert_eq!(small.pixel(0, 0), Some(BLACK));
        assert_eq!(small.pixel(1, 0), Some(WHITE));

        let one = img.resized(1, 1).unwrap();
        let g = one.gray(0, 0).unwrap();
        assert!(approx(g, 0.5, 0.01), "gray={g}");
    }

    #[test]
    fn resize_upsamples_single_pixel_by_replication() {
        let img = RasterImage::filled(1, 1, BLACK);
        let big = img.resized(16, 16).unwrap();
        assert_eq!(big.pixels().len(), 256);
        assert!(big.pixels().iter().all(|p| *p == BLACK));
    }

    #[test]
    fn rotation_grows_canvas_and_fills_transparent() {
        let img = RasterImage::filled(32, 32, BLACK);
        let rot = img.rotated(5.0).unwrap();
        assert!(rot.width() > 32 && rot.height() > 32);
        assert_eq!(rot.pixel(0, 0), Some(TRANSPARENT));
        let (cx, cy) = (rot.width() / 2, rot.height() / 2);
        assert_eq!(rot.pixel(cx, cy), Some(BLACK));
    }

    #[test]
    fn rotation_by_zero_keeps_dimensions_and_content() {
        let img = RasterImage::from_fn(5, 3, |x, y| [x as u8, y as u8, 0, 255]);
        let rot = img.rotated(0.0).unwrap();
        assert_eq!((rot.width(), rot.height()), (5, 3));
        assert_eq!(rot, img);
    }

    #[test]
    fn quarter_turn_swaps_dimensions() {
        let img = RasterImage::filled(6, 2, BLACK);
        let rot = img.rotated(90.0).unwrap();
        assert_eq!((rot.width(), rot.height()), (2, 6));
    }

    #[test]
    fn scale_resizes_canvas() {
        let img = RasterImage::filled(20, 10, BLACK);
        let down = img.scaled(0.9).unwrap();
        assert_eq!((down.width(), down.height()), (18, 9));
        let up = img.scaled(1.1).unwrap();
        assert_eq!((up.width(), up.height()), (22, 11));
        assert!(up.pixels().iter().all(|p| *p == BLACK));
    }

    #[test]
    fn scale_rejects_degenerate_factors() {
        let img = RasterImage::filled(2, 2, BLACK);
        assert!(img.scaled(0.0).is_none());
        assert!(img.scaled(-1.0).is_none());
        assert!(img.scaled(f64::NAN).is_none());
        assert!(img.scaled(0.1).is_none());
    }

    #[test]
    fn translate_shifts_and_fills() {
        let img = RasterImage::from_fn(3, 1, |x, _| if x == 0 { BLACK } else { WHITE });
        let moved = img.translated(1, 0);
        assert_eq!(moved.pixel(0, 0), Some(TRANSPARENT));
        assert_eq!(moved.pixel(1, 0), Some(BLACK));
        assert_eq!(moved.pixel(2, 0), Some(WHITE));
    }

    #[test]
    fn serde_round_trip_validates_dimensions() {
        let img = RasterImage::from_fn(2, 2, |x, y| [x as u8, y as u8, 7, 255]);
        let json = serde_json::to_string(&img).unwrap();
        let back: RasterImage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, img);

        let bad = r#"{"width":2,"height":2,"pixels":[[0,0,0,255]]}"#;
        assert!(serde_json::from_str::<RasterImage>(bad).is_err());
    }
}
