//! Latent-space navigation driven by a loudness scalar.
//!
//! Two strategies share one interface: the target-seeking walk and the
//! volume-scaled sampler. Each keeps its own tuning constants.

mod vector;
mod volume;
mod walk;

use clap::ValueEnum;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::params::{VolumeParams, WalkParams};

// Re-export public types
pub use vector::LatentVector;
pub use volume::VolumeSampler;
pub use walk::LatentWalk;

/// A navigator advanced once per visual tick
pub trait LatentStrategy: Send {
    fn name(&self) -> &'static str;

    fn latent_dim(&self) -> usize;

    /// Advance with this tick's loudness and return the latent to render
    fn step(&mut self, loudness: f32) -> &LatentVector;
}

/// Strategy selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum StrategyKind {
    /// Smooth target-seeking walk
    #[default]
    Walk,

    /// Fresh noise each tick, scaled by volume
    Volume,
}

/// Seeded RNG, or entropy-seeded when no seed is given
pub fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Build the selected strategy
pub fn build_strategy(
    kind: StrategyKind,
    walk: &WalkParams,
    volume: &VolumeParams,
    rng: StdRng,
) -> Box<dyn LatentStrategy> {
    match kind {
        StrategyKind::Walk => Box::new(LatentWalk::new(walk.clone(), rng)),
        StrategyKind::Volume => Box::new(VolumeSampler::new(volume.clone(), rng)),
    }
}
