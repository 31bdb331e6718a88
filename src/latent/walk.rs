//! Target-seeking latent walk.
//!
//! `current` drifts linearly toward a random anchor `target`; when it gets
//! close enough a fresh anchor is drawn. The result is piecewise-directed
//! motion with occasional turns instead of a jittery random walk. Loudness
//! speeds the drift up (capped) and loud transients add a one-tick kick.
//! Both endpoints sit on the sphere of radius sqrt(D), where a standard
//! normal draw is expected to land and the generator behaves best.

use log::{debug, trace};
use rand::rngs::StdRng;

use super::vector::LatentVector;
use super::LatentStrategy;
use crate::params::WalkParams;

/// Navigator state: the walk position, its anchor, and the tuning constants
pub struct LatentWalk {
    params: WalkParams,
    current: LatentVector,
    target: LatentVector,
    rng: StdRng,
    retargets: u64,
}

impl LatentWalk {
    /// Start from two independent random points on the manifold sphere
    pub fn new(params: WalkParams, mut rng: StdRng) -> Self {
        let norm = params.manifold_norm();
        let mut current = LatentVector::sample(params.latent_dim, &mut rng);
        let mut target = LatentVector::sample(params.latent_dim, &mut rng);
        current.renormalize(norm);
        target.renormalize(norm);

        Self::with_endpoints(params, current, target, rng)
    }

    /// Resume a walk from explicit endpoints, taken as given
    pub fn with_endpoints(
        params: WalkParams,
        current: LatentVector,
        target: LatentVector,
        rng: StdRng,
    ) -> Self {
        debug_assert_eq!(current.dim(), params.latent_dim);
        debug_assert_eq!(target.dim(), params.latent_dim);
        Self {
            params,
            current,
            target,
            rng,
            retargets: 0,
        }
    }

    pub fn current(&self) -> &LatentVector {
        &self.current
    }

    pub fn target(&self) -> &LatentVector {
        &self.target
    }

    /// Number of anchors drawn since construction
    pub fn retargets(&self) -> u64 {
        self.retargets
    }

    /// Advance one tick and return the new position
    pub fn step(&mut self, loudness: f32) -> &LatentVector {
        let loudness = if loudness.is_finite() {
            loudness.max(0.0)
        } else {
            0.0
        };
        let dim = self.params.latent_dim;
        let norm = self.params.manifold_norm();

        // Speed: perpetual drift plus capped loudness term. Not clamped to 1.
        let step_size = self.params.step_size(loudness);

        self.current.lerp_towards(&self.target, step_size);

        if self.current.distance(&self.target) < self.params.retarget_threshold {
            self.target = LatentVector::sample(dim, &mut self.rng);
            self.target.renormalize(norm);
            self.retargets += 1;
            debug!("Latent walk retarget #{}", self.retargets);
        }

        if loudness > self.params.kick_threshold {
            let noise = LatentVector::sample(dim, &mut self.rng);
            self.current.add_scaled(&noise, loudness * self.params.kick_scale);
            trace!("Kick at loudness {:.3}", loudness);
        }

        if !self.current.renormalize(norm) {
            // Collapsed onto the origin (e.g. antipodal endpoints at t = 0.5)
            self.current = LatentVector::sample(dim, &mut self.rng);
            self.current.renormalize(norm);
            debug!("Latent walk collapsed to origin; resampled position");
        }
        &self.current
    }
}

impl LatentStrategy for LatentWalk {
    fn name(&self) -> &'static str {
        "walk"
    }

    fn latent_dim(&self) -> usize {
        self.params.latent_dim
    }

    fn step(&mut self, loudness: f32) -> &LatentVector {
        LatentWalk::step(self, loudness)
    }
}
