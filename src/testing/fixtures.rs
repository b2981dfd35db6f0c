use crate::core::RasterImage;
use crate::sketch::StrokeSketch;

const SIZE: f64 = 64.0;

fn draw(sketch: StrokeSketch) -> RasterImage {
    sketch
        .with_line_width(6.0)
        .rasterize()
        .expect("fixture sketches are well-formed")
}

pub fn horizontal_bar() -> RasterImage {
    draw(StrokeSketch::new(64, 64).stroke(&[(8.0, 32.0), (56.0, 32.0)]))
}

pub fn vertical_bar() -> RasterImage {
    draw(StrokeSketch::new(64, 64).stroke(&[(32.0, 8.0), (32.0, 56.0)]))
}

pub fn cross() -> RasterImage {
    draw(
        StrokeSketch::new(64, 64)
            .stroke(&[(8.0, 8.0), (56.0, 56.0)])
            .stroke(&[(56.0, 8.0), (8.0, 56.0)]),
    )
}

pub fn ring() -> RasterImage {
    let points: Vec<(f64, f64)> = (0..=32)
        .map(|i| {
            let t = i as f64 / 32.0 * std::f64::consts::TAU;
            (SIZE / 2.0 + 22.0 * t.cos(), SIZE / 2.0 + 22.0 * t.sin())
        })
        .collect();
    draw(StrokeSketch::new(64, 64).stroke(&points))
}
