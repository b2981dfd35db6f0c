mod augmenter;
mod transform;

pub use augmenter::Augmenter;
pub use transform::Transform;
