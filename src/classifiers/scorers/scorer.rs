use crate::core::{Prediction, RasterImage};
use crate::error::Result;

/// An opaque, pre-trained classifier.
///
/// `Ok(None)` means the scorer has no opinion about this image; an `Err` is
/// treated the same way by callers. Neither is ever surfaced to end users.
pub trait Scorer: Send {
    fn score(&self, image: &RasterImage) -> Result<Option<Prediction>>;

    /// Restores the scorer to the state it had when first loaded.
    fn reload(&mut self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str;
}
