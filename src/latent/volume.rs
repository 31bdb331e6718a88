//! Stateless volume-scaled sampler: a fresh normal draw every tick, scaled by
//! the boosted loudness. Frames are uncorrelated, so motion reads as flicker
//! whose intensity follows the music.

use rand::rngs::StdRng;

use super::vector::LatentVector;
use super::LatentStrategy;
use crate::params::VolumeParams;

pub struct VolumeSampler {
    params: VolumeParams,
    last: LatentVector,
    rng: StdRng,
}

impl VolumeSampler {
    pub fn new(params: VolumeParams, rng: StdRng) -> Self {
        let last = LatentVector::zeros(params.latent_dim);
        Self { params, last, rng }
    }
}

impl LatentStrategy for VolumeSampler {
    fn name(&self) -> &'static str {
        "volume"
    }

    fn latent_dim(&self) -> usize {
        self.params.latent_dim
    }

    fn step(&mut self, loudness: f32) -> &LatentVector {
        let loudness = if loudness.is_finite() {
            loudness.max(0.0)
        } else {
            0.0
        };
        let mut noise = LatentVector::sample(self.params.latent_dim, &mut self.rng);
        noise.scale(self.params.amplitude(loudness));
        self.last = noise;
        &self.last
    }
}
