//! Frame rate, generator, display, and recording configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;
use serde::Deserialize;

use crate::error::ConfigError;

/// Visual tick rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
pub enum FrameRate {
    /// 30 Hz (≈33.3 ms)
    #[default]
    #[value(name = "30")]
    #[serde(rename = "30")]
    Fps30,

    /// 60 Hz (≈16.7 ms)
    #[value(name = "60")]
    #[serde(rename = "60")]
    Fps60,

    /// 120 Hz (≈8.3 ms)
    #[value(name = "120")]
    #[serde(rename = "120")]
    Fps120,
}

impl FrameRate {
    pub fn hz(self) -> u32 {
        match self {
            Self::Fps30 => 30,
            Self::Fps60 => 60,
            Self::Fps120 => 120,
        }
    }

    /// Wall-clock interval between ticks
    pub fn interval(self) -> Duration {
        Duration::from_nanos(1_000_000_000 / self.hz() as u64)
    }
}

/// Compute device for the generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DevicePreference {
    /// GPU when compiled in and present, CPU otherwise
    #[default]
    Auto,

    /// Always CPU
    Cpu,
}

/// Generator model configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Safetensors checkpoint (None = randomly initialised model)
    pub model_path: Option<PathBuf>,

    /// Output image side length (pixels, square)
    pub image_size: usize,

    /// Latent input dimension D
    pub latent_dim: usize,

    /// Width of the coordinate network's hidden layers
    pub hidden_width: usize,

    /// Number of hidden layers after the latent/coordinate merge
    pub hidden_layers: usize,

    pub device: DevicePreference,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            image_size: 256,
            latent_dim: 256,
            hidden_width: 32,
            hidden_layers: 3,
            device: DevicePreference::Auto,
        }
    }
}

impl GeneratorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.image_size == 0 {
            return Err(ConfigError::invalid("render.image_size", "must be > 0"));
        }
        if self.latent_dim == 0 {
            return Err(ConfigError::invalid("render.latent_dim", "must be > 0"));
        }
        if self.hidden_width == 0 {
            return Err(ConfigError::invalid("render.hidden_width", "must be > 0"));
        }
        Ok(())
    }
}

/// On-screen display configuration
#[derive(Debug, Clone)]
pub struct DisplayConfig {
    /// Initial window width (pixels)
    pub window_width: u32,

    /// Initial window height (pixels)
    pub window_height: u32,

    pub title: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            window_width: 768,
            window_height: 768,
            title: "Latentwave".to_string(),
        }
    }
}

/// Recording mode configuration
#[derive(Debug, Clone)]
pub struct RecordingConfig {
    /// Output directory for frames
    pub output_dir: PathBuf,
}

impl RecordingConfig {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Frame directory path
    pub fn frames_dir(&self) -> PathBuf {
        self.output_dir.join("frames")
    }

    /// Path of a numbered frame
    pub fn frame_path(&self, index: u64) -> PathBuf {
        self.frames_dir().join(format!("frame_{:06}.png", index))
    }
}
