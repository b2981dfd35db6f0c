use crate::augmentation::Transform;
use crate::config::AugmentationParameters;
use crate::core::RasterImage;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Expands one taught sketch into perturbed copies.
///
/// The transform plan is fixed at construction, so the same input always
/// yields the same variants.
#[derive(Clone, Debug)]
pub struct Augmenter {
    plan: Vec<Transform>,
}

impl Augmenter {
    pub fn new(plan: Vec<Transform>) -> Self {
        Self { plan }
    }

    /// Two small rotations and two uniform scales.
    pub fn standard() -> Self {
        Self::from_params(&AugmentationParameters::default())
    }

    pub fn disabled() -> Self {
        Self { plan: Vec::new() }
    }

    pub fn from_params(params: &AugmentationParameters) -> Self {
        if !params.enabled {
            return Self::disabled();
        }

        let mut plan: Vec<Transform> = params
            .rotations_deg
            .iter()
            .map(|&degrees| Transform::Rotate { degrees })
            .chain(params.scales.iter().map(|&factor| Transform::Scale { factor }))
            .collect();

        if let Some(jitter) = &params.jitter {
            let mut rng = StdRng::seed_from_u64(jitter.seed);
            let m = jitter.max_shift.min(i32::MAX as u32) as i32;
            for _ in 0..jitter.count {
                plan.push(Transform::Translate {
                    dx: rng.random_range(-m..=m),
                    dy: rng.random_range(-m..=m),
                });
            }
        }

        Self { plan }
    }

    pub fn plan(&self) -> &[Transform] {
        &self.plan
    }

    /// Variants that could be produced, in plan order. Degenerate transforms
    /// are skipped.
    pub fn augment(&self, image: &RasterImage) -> Vec<(Transform, RasterImage)> {
        self.plan
            .iter()
            .filter_map(|t| t.apply(image).map(|img| (*t, img)))
            .collect()
    }
}

impl Default for Augmenter {
    fn default() -> Self {
        Self::standard()
    }
}
