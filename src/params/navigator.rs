//! Latent navigation tuning constants.
//!
//! Distances are Euclidean in latent space, where a standard normal point of
//! dimension D sits at radius sqrt(D). Speeds are interpolation fractions per tick.

use serde::Deserialize;

use crate::error::ConfigError;

/// Target-seeking walk parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WalkParams {
    /// Latent vector dimension D
    pub latent_dim: usize,

    /// Interpolation fraction applied every tick, even in silence
    pub base_speed: f32,

    /// Loudness → extra interpolation fraction
    /// Formula: dynamic = min(loudness * dynamic_gain, max_dynamic_speed)
    pub dynamic_gain: f32,

    /// Cap on the loudness-driven fraction
    pub max_dynamic_speed: f32,

    /// Distance to target below which a new target is drawn
    pub retarget_threshold: f32,

    /// Loudness above which a transient impulse is added
    pub kick_threshold: f32,

    /// Impulse magnitude per unit loudness
    pub kick_scale: f32,
}

impl Default for WalkParams {
    fn default() -> Self {
        Self {
            latent_dim: 256,
            base_speed: 0.01,
            dynamic_gain: 0.5,
            max_dynamic_speed: 0.1,
            retarget_threshold: 0.2,
            kick_threshold: 0.5,
            kick_scale: 0.3,
        }
    }
}

impl WalkParams {
    /// Interpolation fraction for one tick at the given loudness
    pub fn step_size(&self, loudness: f32) -> f32 {
        let dynamic_speed = (loudness * self.dynamic_gain).min(self.max_dynamic_speed);
        self.base_speed + dynamic_speed
    }

    /// Norm every latent is rescaled to (sqrt(D))
    pub fn manifold_norm(&self) -> f32 {
        (self.latent_dim as f32).sqrt()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.latent_dim == 0 {
            return Err(ConfigError::invalid("navigator.latent_dim", "must be > 0"));
        }
        for (field, value) in [
            ("navigator.base_speed", self.base_speed),
            ("navigator.dynamic_gain", self.dynamic_gain),
            ("navigator.max_dynamic_speed", self.max_dynamic_speed),
            ("navigator.retarget_threshold", self.retarget_threshold),
            ("navigator.kick_threshold", self.kick_threshold),
            ("navigator.kick_scale", self.kick_scale),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::invalid(
                    field,
                    format!("must be finite and >= 0, got {}", value),
                ));
            }
        }
        if self.base_speed + self.max_dynamic_speed > 1.0 {
            // Allowed: interpolation is left unclamped and will overshoot the target.
            log::warn!(
                "base_speed + max_dynamic_speed = {} exceeds 1.0; steps may overshoot the target",
                self.base_speed + self.max_dynamic_speed
            );
        }
        Ok(())
    }
}

/// Volume-scaled noise sampler parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VolumeParams {
    /// Latent vector dimension D
    pub latent_dim: usize,

    /// Loudness multiplier before capping
    pub volume_boost: f32,

    /// Noise amplitude in silence
    pub base_amplitude: f32,

    /// Cap on the boosted loudness added to the amplitude
    /// Formula: amplitude = base_amplitude + min(loudness * volume_boost, max_boost)
    pub max_boost: f32,
}

impl Default for VolumeParams {
    fn default() -> Self {
        Self {
            latent_dim: 256,
            volume_boost: 5.0,
            base_amplitude: 0.5,
            max_boost: 1.5,
        }
    }
}

impl VolumeParams {
    pub fn amplitude(&self, loudness: f32) -> f32 {
        self.base_amplitude + (loudness * self.volume_boost).min(self.max_boost)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.latent_dim == 0 {
            return Err(ConfigError::invalid("volume.latent_dim", "must be > 0"));
        }
        for (field, value) in [
            ("volume.volume_boost", self.volume_boost),
            ("volume.base_amplitude", self.base_amplitude),
            ("volume.max_boost", self.max_boost),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::invalid(
                    field,
                    format!("must be finite and >= 0, got {}", value),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dynamic_speed_is_capped() {
        let params = WalkParams::default();
        let saturating = params.max_dynamic_speed / params.dynamic_gain;

        assert_eq!(params.step_size(0.0), params.base_speed);
        assert_eq!(params.step_size(1000.0), params.step_size(saturating));
        assert!(
            (params.step_size(1000.0) - (params.base_speed + params.max_dynamic_speed)).abs()
                < 1e-7
        );
    }

    #[test]
    fn test_manifold_norm() {
        let params = WalkParams {
            latent_dim: 4,
            ..WalkParams::default()
        };
        assert_eq!(params.manifold_norm(), 2.0);
    }

    #[test]
    fn test_negative_constant_rejected() {
        let params = WalkParams {
            kick_scale: -1.0,
            ..WalkParams::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_volume_amplitude() {
        let params = VolumeParams::default();
        assert_eq!(params.amplitude(0.0), 0.5);
        assert_eq!(params.amplitude(0.1), 1.0);
        // Boost saturates at max_boost
        assert_eq!(params.amplitude(10.0), 2.0);
    }

    #[test]
    fn test_volume_rejects_bad_boost() {
        assert!(VolumeParams::default().validate().is_ok());
        for params in [
            VolumeParams {
                volume_boost: f32::NAN,
                ..VolumeParams::default()
            },
            VolumeParams {
                volume_boost: -1.0,
                ..VolumeParams::default()
            },
            VolumeParams {
                max_boost: -0.5,
                ..VolumeParams::default()
            },
        ] {
            assert!(params.validate().is_err(), "{:?} accepted", params);
        }
    }
}
