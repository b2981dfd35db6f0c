use crate::core::RasterImage;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Transform {
    Rotate { degrees: f64 },
    Scale { factor: f64 },
    Translate { dx: i32, dy: i32 },
}

impl Transform {
    /// `None` when the transform is geometrically degenerate for `image`.
    pub fn apply(&self, image: &RasterImage) -> Option<RasterImage> {
        match *self {
            Transform::Rotate { degrees } => image.rotated(degrees),
            Transform::Scale { factor } => image.scaled(factor),
            Transform::Translate { dx, dy } => {
                if image.is_empty() {
                    None
                } else {
                    Some(image.translated(dx, dy))
                }
            }
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transform::Rotate { degrees } => write!(f, "rotate({degrees:+}°)"),
            Transform::Scale { factor } => write!(f, "scale({factor}x)"),
            Transform::Translate { dx, dy } => write!(f, "translate({dx:+}, {dy:+})"),
        }
    }
}
