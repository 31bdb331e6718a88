//! Optional TOML settings file.
//!
//! Every section is optional; missing keys fall back to the struct defaults.
//!
//! ```toml
//! fps = "60"
//!
//! [navigator]
//! base_speed = 0.02
//! kick_threshold = 0.4
//!
//! [audio]
//! window_size = "2048"
//! ```

use std::fs;
use std::path::Path;

use log::debug;
use serde::Deserialize;

use super::{AudioConfig, FrameRate, GeneratorConfig, VolumeParams, WalkParams};
use crate::error::ConfigError;

/// Settings loaded from disk
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub fps: FrameRate,
    pub audio: AudioConfig,
    pub navigator: WalkParams,
    pub volume: VolumeParams,
    pub render: GeneratorConfig,
}

impl Settings {
    /// Parse settings from TOML text
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load settings from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_toml(&text)?;
        debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Validate every section
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.audio.validate()?;
        self.navigator.validate()?;
        self.volume.validate()?;
        self.render.validate()?;
        for (field, dim) in [
            ("navigator.latent_dim", self.navigator.latent_dim),
            ("volume.latent_dim", self.volume.latent_dim),
        ] {
            if dim != self.render.latent_dim {
                return Err(ConfigError::invalid(
                    field,
                    format!(
                        "{} does not match render.latent_dim {}",
                        dim, self.render.latent_dim
                    ),
                ));
            }
        }
        Ok(())
    }
}
