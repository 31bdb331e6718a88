//! Fixed-dimension latent vectors and the arithmetic the navigators need.

use rand::Rng;
use rand_distr::StandardNormal;

/// Point in the generator's input space
#[derive(Debug, Clone, PartialEq)]
pub struct LatentVector {
    values: Vec<f32>,
}

impl LatentVector {
    pub fn zeros(dim: usize) -> Self {
        Self {
            values: vec![0.0; dim],
        }
    }

    pub fn from_vec(values: Vec<f32>) -> Self {
        Self { values }
    }

    /// Independent standard normal draw of dimension `dim`
    pub fn sample<R: Rng + ?Sized>(dim: usize, rng: &mut R) -> Self {
        Self {
            values: (0..dim).map(|_| rng.sample(StandardNormal)).collect(),
        }
    }

    pub fn dim(&self) -> usize {
        self.values.len()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    pub fn norm(&self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn dot(&self, other: &Self) -> f32 {
        debug_assert_eq!(self.dim(), other.dim());
        self.values
            .iter()
            .zip(&other.values)
            .map(|(a, b)| a * b)
            .sum()
    }

    /// Euclidean distance
    pub fn distance(&self, other: &Self) -> f32 {
        debug_assert_eq!(self.dim(), other.dim());
        self.values
            .iter()
            .zip(&other.values)
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f32>()
            .sqrt()
    }

    /// self = (1 - t) * self + t * target (t is not clamped)
    pub fn lerp_towards(&mut self, target: &Self, t: f32) {
        debug_assert_eq!(self.dim(), target.dim());
        for (v, &goal) in self.values.iter_mut().zip(&target.values) {
            *v = (1.0 - t) * *v + t * goal;
        }
    }

    /// self += other * scale
    pub fn add_scaled(&mut self, other: &Self, scale: f32) {
        debug_assert_eq!(self.dim(), other.dim());
        for (v, &o) in self.values.iter_mut().zip(&other.values) {
            *v += o * scale;
        }
    }

    pub fn scale(&mut self, factor: f32) {
        for v in &mut self.values {
            *v *= factor;
        }
    }

    /// Rescale to the given norm. A zero or non-finite vector is left untouched
    /// and `false` is returned.
    pub fn renormalize(&mut self, target_norm: f32) -> bool {
        let norm = self.norm();
        if !norm.is_finite() || norm <= f32::EPSILON {
            return false;
        }
        self.scale(target_norm / norm);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_norm_and_distance() {
        let a = LatentVector::from_vec(vec![3.0, 4.0]);
        let b = LatentVector::zeros(2);
        assert_eq!(a.norm(), 5.0);
        assert_eq!(a.distance(&b), 5.0);
        assert_eq!(a.dot(&a), 25.0);
    }

    #[test]
    fn test_lerp_towards() {
        let mut a = LatentVector::from_vec(vec![0.0, 10.0]);
        let b = LatentVector::from_vec(vec![10.0, 0.0]);
        a.lerp_towards(&b, 0.25);
        assert_eq!(a.as_slice(), &[2.5, 7.5]);
    }

    #[test]
    fn test_renormalize() {
        let mut a = LatentVector::from_vec(vec![1.0, 1.0, 1.0, 1.0]);
        assert!(a.renormalize(4.0));
        assert!((a.norm() - 4.0).abs() < 1e-6);
        assert_eq!(a.as_slice(), &[2.0, 2.0, 2.0, 2.0]);
    }

    #[test]
    fn test_renormalize_zero_is_noop() {
        let mut zero = LatentVector::zeros(3);
        assert!(!zero.renormalize(1.0));
        assert_eq!(zero, LatentVector::zeros(3));
    }

    #[test]
    fn test_sample_statistics() {
        let mut rng = StdRng::seed_from_u64(7);
        let dim = 4096;
        let v = LatentVector::sample(dim, &mut rng);

        assert_eq!(v.dim(), dim);
        let mean = v.as_slice().iter().sum::<f32>() / dim as f32;
        assert!(mean.abs() < 0.1, "mean {}", mean);
        // Expected norm of a standard normal vector is ≈ sqrt(D)
        let ratio = v.norm() / (dim as f32).sqrt();
        assert!((ratio - 1.0).abs() < 0.05, "norm ratio {}", ratio);
    }

    #[test]
    fn test_seeded_samples_repeat() {
        let a = LatentVector::sample(8, &mut StdRng::seed_from_u64(1));
        let b = LatentVector::sample(8, &mut StdRng::seed_from_u64(1));
        assert_eq!(a, b);
    }
}
